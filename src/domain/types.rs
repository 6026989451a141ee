use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Advisory penalty for one candidate listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JunkScore {
    pub penalty: f64,
    pub matched_keywords: Vec<String>,
    pub seller_report_count: u32,
}

impl JunkScore {
    /// Subtracts the penalty from an externally computed confidence, floored at zero.
    pub fn apply_to(&self, confidence: f64) -> f64 {
        (confidence - self.penalty).max(0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalSnapshot {
    pub keywords: HashSet<String>,
    // only sellers at or above the reporting threshold
    pub seller_counts: HashMap<String, u32>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub keyword_count: usize,
    pub flagged_sellers: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CardVocabulary {
    pub card_name: String,
    pub expansion_name: Option<String>,
    pub expansion_code: Option<String>,
}

impl CardVocabulary {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.card_name.as_str())
            .chain(self.expansion_name.as_deref())
            .chain(self.expansion_code.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_to_floors_at_zero() {
        let score = JunkScore {
            penalty: 0.35,
            ..Default::default()
        };
        assert!((score.apply_to(0.9) - 0.55).abs() < 1e-9);
        assert_eq!(score.apply_to(0.2), 0.0);
    }
}
