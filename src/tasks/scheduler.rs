use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::signals::LearnedSignalCache;

/// Reloads the learned-signal cache once per `interval`, whether or not requests touched it.
pub async fn configure_refresh_job(
    interval: Duration,
    cache: Arc<LearnedSignalCache>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let job = Job::new_repeated_async(interval, move |_id, _l| {
        let cache = cache.clone();
        Box::pin(async move {
            match cache.reload().await {
                Ok(()) => {
                    let stats = cache.stats();
                    tracing::debug!(
                        target: "scheduler",
                        keywords = stats.keyword_count,
                        flagged_sellers = stats.flagged_sellers,
                        "learned signal refresh tick"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        target: "scheduler",
                        error = %err,
                        "scheduled learned signal reload failed; keeping previous snapshot"
                    );
                }
            }
        })
    })?;
    scheduler.add(job).await?;
    tracing::info!(target: "scheduler", interval_secs = interval.as_secs(), "refresh job registered");
    scheduler.start().await?;
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::JunkSignalConfig,
        domain::NewJunkReport,
        signals::{memory::MemoryStore, store::ReportStore},
    };

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn ticks_reload_without_callers() {
        let store = Arc::new(MemoryStore::new());
        let config = JunkSignalConfig {
            refresh_interval: Duration::from_secs(1),
            ..JunkSignalConfig::default()
        };
        let cache = Arc::new(LearnedSignalCache::new(store.clone(), &config));
        cache.warm_up().await;
        assert_eq!(store.token_queries(), 1);

        store
            .insert_report(NewJunkReport {
                deal_id: "deal-1".to_string(),
                listing_id: "item-1".to_string(),
                raw_title: "Charizard Orica".to_string(),
                seller_name: None,
                learned_tokens: vec!["orica".to_string()],
            })
            .await
            .unwrap();

        let mut scheduler = configure_refresh_job(config.refresh_interval, cache.clone())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        scheduler.shutdown().await.unwrap();

        // no invalidation and no scoring: only the job reloads
        assert!(store.token_queries() >= 3, "queries = {}", store.token_queries());
        assert!(cache.snapshot().keywords.contains("orica"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failing_tick_keeps_snapshot() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_report(NewJunkReport {
                deal_id: "deal-1".to_string(),
                listing_id: "item-1".to_string(),
                raw_title: "Lugia Fake".to_string(),
                seller_name: None,
                learned_tokens: vec!["fake".to_string()],
            })
            .await
            .unwrap();
        let config = JunkSignalConfig {
            refresh_interval: Duration::from_secs(1),
            ..JunkSignalConfig::default()
        };
        let cache = Arc::new(LearnedSignalCache::new(store.clone(), &config));
        cache.warm_up().await;

        store.set_reports_unavailable(true);
        let mut scheduler = configure_refresh_job(config.refresh_interval, cache.clone())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        scheduler.shutdown().await.unwrap();

        assert!(cache.snapshot().keywords.contains("fake"));
    }
}
