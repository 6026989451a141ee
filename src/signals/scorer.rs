use std::sync::Arc;

use crate::{
    config::JunkSignalConfig,
    domain::{normalize_seller, JunkScore},
};

use super::cache::LearnedSignalCache;

#[derive(Debug, Clone, Copy)]
struct PenaltyWeights {
    learned_keyword: f64,
    seller_threshold: u32,
    seller_per_report: f64,
    seller_cap: f64,
}

/// Soft junk penalty for candidate listings. Never rejects a listing on its own.
pub struct JunkScorer {
    cache: Arc<LearnedSignalCache>,
    weights: PenaltyWeights,
}

impl JunkScorer {
    pub fn new(cache: Arc<LearnedSignalCache>, config: &JunkSignalConfig) -> Self {
        Self {
            cache,
            weights: PenaltyWeights {
                learned_keyword: config.learned_keyword_penalty,
                seller_threshold: config.seller_penalty_threshold,
                seller_per_report: config.seller_penalty_per_report,
                seller_cap: config.seller_penalty_cap,
            },
        }
    }

    pub async fn score(&self, cleaned_title: &str, seller_name: Option<&str>) -> JunkScore {
        self.cache.ensure_fresh().await;
        let snapshot = self.cache.snapshot();

        let matched_keywords: Vec<String> = cleaned_title
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| snapshot.keywords.contains(token))
            .collect();

        let mut score = JunkScore::default();
        if !matched_keywords.is_empty() {
            // flat: several learned keywords in one title do not stack
            score.penalty += self.weights.learned_keyword;
        }
        score.matched_keywords = matched_keywords;

        if let Some(&count) =
            normalize_seller(seller_name).and_then(|seller| snapshot.seller_counts.get(seller))
        {
            score.seller_report_count = count;
            score.penalty += self.seller_penalty(count);
        }

        if score.penalty > 0.0 {
            tracing::debug!(
                target: "signals",
                penalty = score.penalty,
                matched = ?score.matched_keywords,
                seller_reports = score.seller_report_count,
                "junk signals matched"
            );
        }
        score
    }

    pub fn seller_penalty(&self, report_count: u32) -> f64 {
        let w = &self.weights;
        if report_count < w.seller_threshold {
            return 0.0;
        }
        let over = f64::from(report_count - w.seller_threshold + 1);
        (over * w.seller_per_report).min(w.seller_cap)
    }
}
