pub mod report;
pub mod types;

pub use report::{normalize_seller, JunkReportRequest, JunkReportRow, NewJunkReport, RecordedReport};
pub use types::{CacheStats, CardVocabulary, JunkScore, SignalSnapshot};
