use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct JunkReportRequest {
    pub deal_id: String,
    pub listing_id: String,
    pub title: String,
    pub seller_name: Option<String>,
    pub card_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJunkReport {
    pub deal_id: String,
    pub listing_id: String,
    pub raw_title: String,
    pub seller_name: Option<String>,
    pub learned_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JunkReportRow {
    pub deal_id: String,
    pub listing_id: String,
    pub raw_title: String,
    pub seller_name: Option<String>,
    pub learned_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedReport {
    pub learned_tokens: Vec<String>,
    /// `false` when the deal had already been reported and the write was a no-op.
    pub newly_recorded: bool,
}

pub fn normalize_seller(seller: Option<&str>) -> Option<&str> {
    seller.map(str::trim).filter(|s| !s.is_empty())
}
