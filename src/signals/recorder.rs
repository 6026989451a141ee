use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::{normalize_seller, JunkReportRequest, NewJunkReport, RecordedReport};

use super::{cache::LearnedSignalCache, extractor::TokenExtractor, store::ReportStore};

pub struct ReportRecorder {
    extractor: TokenExtractor,
    store: Arc<dyn ReportStore>,
    cache: Arc<LearnedSignalCache>,
}

impl ReportRecorder {
    pub fn new(
        extractor: TokenExtractor,
        store: Arc<dyn ReportStore>,
        cache: Arc<LearnedSignalCache>,
    ) -> Self {
        Self {
            extractor,
            store,
            cache,
        }
    }

    /// Stores the report (once per deal) and marks the learned signals stale.
    /// Store write failures are returned to the caller.
    pub async fn record(&self, request: JunkReportRequest) -> Result<RecordedReport> {
        let learned_tokens = self
            .extractor
            .extract(&request.title, request.card_id.as_deref())
            .await;

        let report = NewJunkReport {
            seller_name: normalize_seller(request.seller_name.as_deref()).map(str::to_string),
            deal_id: request.deal_id,
            listing_id: request.listing_id,
            raw_title: request.title,
            learned_tokens: learned_tokens.clone(),
        };
        let deal_id = report.deal_id.clone();
        let newly_recorded = self
            .store
            .insert_report(report)
            .await
            .with_context(|| format!("failed to store junk report for deal {deal_id}"))?;

        self.cache.invalidate();

        if newly_recorded {
            tracing::info!(
                target: "signals",
                deal_id = %deal_id,
                tokens = ?learned_tokens,
                "junk report recorded"
            );
        } else {
            tracing::debug!(target: "signals", deal_id = %deal_id, "deal already reported; skipped");
        }

        Ok(RecordedReport {
            learned_tokens,
            newly_recorded,
        })
    }

    pub async fn record_and_reload(&self, request: JunkReportRequest) -> Result<RecordedReport> {
        let recorded = self.record(request).await?;
        self.cache.ensure_fresh().await;
        Ok(recorded)
    }
}
