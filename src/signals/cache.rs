use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::{sync::Mutex as AsyncMutex, time::timeout};

use crate::{
    config::JunkSignalConfig,
    domain::{CacheStats, SignalSnapshot},
};

use super::store::ReportStore;

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("report store did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshed_at: Option<Instant>,
    // bumped by invalidate(); a reload that started earlier leaves the cache stale
    epoch: u64,
}

/// Process-local snapshot of learned keywords and flagged sellers.
///
/// Readers clone the current `Arc<SignalSnapshot>`; reloads build a new snapshot
/// and swap it in whole. Reloads are serialized behind a single async guard.
pub struct LearnedSignalCache {
    store: Arc<dyn ReportStore>,
    refresh_interval: Duration,
    seller_threshold: u32,
    store_timeout: Duration,
    snapshot: RwLock<Arc<SignalSnapshot>>,
    refresh: Mutex<RefreshState>,
    reload_guard: AsyncMutex<()>,
}

impl LearnedSignalCache {
    pub fn new(store: Arc<dyn ReportStore>, config: &JunkSignalConfig) -> Self {
        Self {
            store,
            refresh_interval: config.refresh_interval,
            seller_threshold: config.seller_penalty_threshold,
            store_timeout: config.store_timeout,
            snapshot: RwLock::new(Arc::new(SignalSnapshot::default())),
            refresh: Mutex::new(RefreshState::default()),
            reload_guard: AsyncMutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Arc<SignalSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn stats(&self) -> CacheStats {
        let snapshot = self.snapshot();
        CacheStats {
            keyword_count: snapshot.keywords.len(),
            flagged_sellers: snapshot.seller_counts.len(),
            loaded_at: snapshot.loaded_at,
        }
    }

    pub fn is_stale(&self) -> bool {
        match self.refresh.lock().refreshed_at {
            Some(at) => at.elapsed() > self.refresh_interval,
            None => true,
        }
    }

    /// Reloads when the snapshot is older than the refresh interval. Never fails;
    /// a failed reload is logged and retried on the next call.
    pub async fn ensure_fresh(&self) {
        if !self.is_stale() {
            return;
        }
        let _guard = self.reload_guard.lock().await;
        // another caller may have reloaded while we waited
        if !self.is_stale() {
            return;
        }
        if let Err(err) = self.reload_locked().await {
            tracing::warn!(
                target: "signals",
                error = %err,
                "learned signal reload failed; keeping previous snapshot"
            );
        }
    }

    pub async fn reload(&self) -> Result<(), ReloadError> {
        let _guard = self.reload_guard.lock().await;
        self.reload_locked().await
    }

    pub fn invalidate(&self) {
        let mut state = self.refresh.lock();
        state.refreshed_at = None;
        state.epoch = state.epoch.wrapping_add(1);
    }

    pub async fn warm_up(&self) -> CacheStats {
        self.ensure_fresh().await;
        let stats = self.stats();
        tracing::info!(
            target: "signals",
            keywords = stats.keyword_count,
            flagged_sellers = stats.flagged_sellers,
            "learned signal cache warmed"
        );
        stats
    }

    async fn reload_locked(&self) -> Result<(), ReloadError> {
        let epoch = self.refresh.lock().epoch;
        let started = Instant::now();

        let load = async {
            let tokens = self.store.list_learned_tokens().await?;
            let sellers = self
                .store
                .list_seller_report_counts(self.seller_threshold)
                .await?;
            Ok::<_, anyhow::Error>((tokens, sellers))
        };
        let (tokens, mut seller_counts) = timeout(self.store_timeout, load)
            .await
            .map_err(|_| ReloadError::Timeout(self.store_timeout))??;

        seller_counts.retain(|seller, count| !seller.is_empty() && *count >= self.seller_threshold);
        let snapshot = SignalSnapshot {
            keywords: tokens.into_iter().map(|t| t.to_lowercase()).collect(),
            seller_counts,
            loaded_at: Some(Utc::now()),
        };
        let keyword_count = snapshot.keywords.len();
        let flagged_sellers = snapshot.seller_counts.len();
        *self.snapshot.write() = Arc::new(snapshot);

        let mut state = self.refresh.lock();
        if state.epoch == epoch {
            state.refreshed_at = Some(Instant::now());
        }
        drop(state);

        tracing::debug!(
            target: "signals",
            keywords = keyword_count,
            flagged_sellers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "learned signal snapshot reloaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::Result;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::{domain::NewJunkReport, signals::memory::MemoryStore};

    fn report(deal: &str, seller: Option<&str>, tokens: &[&str]) -> NewJunkReport {
        NewJunkReport {
            deal_id: deal.to_string(),
            listing_id: format!("item-{deal}"),
            raw_title: tokens.join(" "),
            seller_name: seller.map(str::to_string),
            learned_tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn cache_over(store: Arc<MemoryStore>) -> LearnedSignalCache {
        LearnedSignalCache::new(store, &JunkSignalConfig::default())
    }

    #[tokio::test]
    async fn cold_cache_is_empty_and_stale() {
        let cache = cache_over(Arc::new(MemoryStore::new()));
        assert!(cache.is_stale());
        assert!(cache.snapshot().keywords.is_empty());
        assert!(cache.snapshot().loaded_at.is_none());
    }

    #[tokio::test]
    async fn fresh_cache_ignores_new_reports_until_invalidated() {
        let store = Arc::new(MemoryStore::new());
        store.insert_report(report("d1", None, &["fake"])).await.unwrap();
        let cache = cache_over(store.clone());

        cache.ensure_fresh().await;
        assert!(!cache.is_stale());
        assert!(cache.snapshot().keywords.contains("fake"));

        store.insert_report(report("d2", None, &["proxy"])).await.unwrap();
        cache.ensure_fresh().await;
        assert!(!cache.snapshot().keywords.contains("proxy"));

        cache.invalidate();
        assert!(cache.is_stale());
        cache.ensure_fresh().await;
        assert!(cache.snapshot().keywords.contains("proxy"));
        assert_eq!(store.token_queries(), 2);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_snapshot_and_retries() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..4 {
            store
                .insert_report(report(&format!("d{i}"), Some("badseller99"), &["reprint"]))
                .await
                .unwrap();
        }
        let cache = cache_over(store.clone());
        cache.ensure_fresh().await;
        let before = cache.snapshot();

        store.set_reports_unavailable(true);
        cache.invalidate();
        assert!(matches!(cache.reload().await, Err(ReloadError::Store(_))));
        cache.ensure_fresh().await;

        let after = cache.snapshot();
        assert_eq!(after.keywords, before.keywords);
        assert_eq!(after.seller_counts, before.seller_counts);
        assert!(cache.is_stale());

        store.set_reports_unavailable(false);
        cache.ensure_fresh().await;
        assert!(!cache.is_stale());
    }

    #[tokio::test]
    async fn below_threshold_sellers_are_absent() {
        let store = Arc::new(MemoryStore::new());
        store.insert_report(report("d1", Some("once"), &[])).await.unwrap();
        for i in 0..3 {
            store
                .insert_report(report(&format!("t{i}"), Some("thrice"), &[]))
                .await
                .unwrap();
        }
        let cache = cache_over(store);
        cache.ensure_fresh().await;

        let snapshot = cache.snapshot();
        assert!(!snapshot.seller_counts.contains_key("once"));
        assert_eq!(snapshot.seller_counts.get("thrice"), Some(&3));
        assert_eq!(cache.stats().flagged_sellers, 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_reload() {
        let store = Arc::new(MemoryStore::new());
        store.insert_report(report("d1", None, &["fake"])).await.unwrap();
        let cache = cache_over(store.clone());

        futures::future::join_all((0..8).map(|_| cache.ensure_fresh())).await;

        assert_eq!(store.token_queries(), 1);
        assert!(cache.snapshot().keywords.contains("fake"));
    }

    struct SlowStore;

    #[async_trait]
    impl ReportStore for SlowStore {
        async fn list_learned_tokens(&self) -> Result<Vec<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec!["late".to_string()])
        }

        async fn list_seller_report_counts(&self, _threshold: u32) -> Result<HashMap<String, u32>> {
            Ok(HashMap::new())
        }

        async fn insert_report(&self, _report: NewJunkReport) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn reload_times_out_without_clearing_snapshot() {
        let config = JunkSignalConfig {
            store_timeout: Duration::from_millis(20),
            ..JunkSignalConfig::default()
        };
        let cache = LearnedSignalCache::new(Arc::new(SlowStore), &config);

        let result = cache.reload().await;
        assert!(matches!(result, Err(ReloadError::Timeout(_))));
        assert!(cache.snapshot().keywords.is_empty());
        assert!(cache.is_stale());
    }

    struct GatedStore {
        inner: MemoryStore,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ReportStore for GatedStore {
        async fn list_learned_tokens(&self) -> Result<Vec<String>> {
            let tokens = self.inner.list_learned_tokens().await?;
            self.entered.notify_one();
            self.release.notified().await;
            Ok(tokens)
        }

        async fn list_seller_report_counts(&self, threshold: u32) -> Result<HashMap<String, u32>> {
            self.inner.list_seller_report_counts(threshold).await
        }

        async fn insert_report(&self, report: NewJunkReport) -> Result<bool> {
            self.inner.insert_report(report).await
        }
    }

    #[tokio::test]
    async fn invalidation_during_reload_keeps_cache_stale() {
        let store = Arc::new(GatedStore {
            inner: MemoryStore::new(),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let cache = Arc::new(LearnedSignalCache::new(
            store.clone(),
            &JunkSignalConfig::default(),
        ));

        let reloading = tokio::spawn({
            let cache = cache.clone();
            async move { cache.reload().await }
        });
        store.entered.notified().await;
        store.inner.insert_report(report("d1", None, &["fake"])).await.unwrap();
        cache.invalidate();
        store.release.notify_one();
        reloading.await.unwrap().unwrap();

        assert!(cache.is_stale());
        assert!(!cache.snapshot().keywords.contains("fake"));

        store.release.notify_one();
        cache.ensure_fresh().await;
        assert!(cache.snapshot().keywords.contains("fake"));
    }
}
