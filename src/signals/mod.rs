pub mod cache;
pub mod extractor;
pub mod memory;
pub mod recorder;
pub mod scorer;
pub mod store;

use std::sync::Arc;

use crate::config::JunkSignalConfig;

pub use cache::{LearnedSignalCache, ReloadError};
pub use extractor::TokenExtractor;
pub use memory::MemoryStore;
pub use recorder::ReportRecorder;
pub use scorer::JunkScorer;
pub use store::{CatalogLookup, ReportStore};

/// The scorer and recorder wired to one shared learned-signal cache.
pub struct JunkSignals {
    pub cache: Arc<LearnedSignalCache>,
    pub scorer: JunkScorer,
    pub recorder: ReportRecorder,
}

impl JunkSignals {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        catalog: Arc<dyn CatalogLookup>,
        config: &JunkSignalConfig,
    ) -> Self {
        let cache = Arc::new(LearnedSignalCache::new(reports.clone(), config));
        let extractor = TokenExtractor::new(catalog, config.catalog_lookup_limit);
        Self {
            scorer: JunkScorer::new(cache.clone(), config),
            recorder: ReportRecorder::new(extractor, reports, cache.clone()),
            cache,
        }
    }
}
