//! Learned junk-listing signals for the deal scanner.
//!
//! Reviewers flag junk deals; the vocabulary of those listings and the
//! reporting history of their sellers become a soft penalty that the
//! matching pipeline subtracts from its confidence score.

pub mod app;
pub mod config;
pub mod db;
pub mod domain;
pub mod infrastructure;
pub mod signals;
pub mod tasks;

pub use domain::{JunkReportRequest, JunkScore, RecordedReport};
pub use signals::{JunkScorer, JunkSignals, LearnedSignalCache, ReportRecorder};
