use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::time::timeout;

use crate::{
    config::AppConfig,
    db::{self, catalog::CatalogRepository, reports::JunkReportRepository},
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    signals::JunkSignals,
    tasks::scheduler::configure_refresh_job,
};

pub struct JunkSignalApp {
    _paths: ResolvedPaths,
    reports: Arc<JunkReportRepository>,
    signals: Arc<JunkSignals>,
    refresh_interval: Duration,
    shutdown: Shutdown,
}

impl JunkSignalApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let pool = db::init_pool(&paths.db_path).await?;
        let reports = Arc::new(JunkReportRepository::new(pool.clone()));
        let catalog = Arc::new(CatalogRepository::new(pool));

        let signals = Arc::new(JunkSignals::new(
            reports.clone(),
            catalog,
            &config.signals,
        ));

        Ok(Self {
            _paths: paths,
            reports,
            signals,
            refresh_interval: config.signals.refresh_interval,
            shutdown,
        })
    }

    pub fn signals(&self) -> Arc<JunkSignals> {
        self.signals.clone()
    }

    pub async fn run(self) -> Result<()> {
        let JunkSignalApp {
            _paths: _,
            reports,
            signals,
            refresh_interval,
            shutdown,
        } = self;

        let stats = signals.cache.warm_up().await;
        // the first tick lands one full interval after the warm snapshot
        let mut scheduler = configure_refresh_job(refresh_interval, signals.cache.clone()).await?;

        match reports.count().await {
            Ok(stored) => tracing::info!(
                reports = stored,
                keywords = stats.keyword_count,
                flagged_sellers = stats.flagged_sellers,
                "junk signal service started"
            ),
            Err(err) => tracing::warn!(
                target: "db",
                error = %err,
                keywords = stats.keyword_count,
                flagged_sellers = stats.flagged_sellers,
                "junk signal service started; report count unavailable"
            ),
        }

        shutdown.requested().await;
        tracing::info!("shutdown requested");

        let shutdown_timeout = Duration::from_secs(5);
        match timeout(shutdown_timeout, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(target: "scheduler", ?err, "failed to stop scheduler");
            }
            Err(_) => {
                tracing::warn!(
                    target: "scheduler",
                    "scheduler did not stop within {:?}",
                    shutdown_timeout
                );
            }
        }

        if timeout(shutdown_timeout, reports.close()).await.is_err() {
            tracing::warn!(
                target: "db",
                "database pool did not close within {:?}",
                shutdown_timeout
            );
        }

        tracing::info!("junk signal service stopped");
        Ok(())
    }
}
