use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{CardVocabulary, NewJunkReport};

/// Persistence for junk reports, reduced to what the learned signals need.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn list_learned_tokens(&self) -> Result<Vec<String>>;

    async fn list_seller_report_counts(&self, threshold: u32) -> Result<HashMap<String, u32>>;

    /// Stores a report unless one already exists for the deal. Returns whether a row was written.
    async fn insert_report(&self, report: NewJunkReport) -> Result<bool>;
}

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn card_vocabulary(&self, card_id: &str) -> Result<Option<CardVocabulary>>;

    // case-insensitive substring match, at most `limit` rows
    async fn names_containing(&self, fragment: &str, limit: u32) -> Result<Vec<String>>;
}
