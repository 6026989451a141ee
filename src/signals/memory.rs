//! In-process implementation of the report and catalog stores.
//!
//! Useful for tests and for embedding the scorer without a database. Failure
//! switches let callers simulate an unavailable store.

use std::{
    collections::{BTreeSet, HashMap},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{CardVocabulary, NewJunkReport};

use super::store::{CatalogLookup, ReportStore};

#[derive(Debug, Clone)]
struct CatalogCard {
    id: String,
    name: String,
    expansion_name: Option<String>,
    expansion_code: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: Mutex<Vec<NewJunkReport>>,
    cards: Mutex<Vec<CatalogCard>>,
    fail_reports: AtomicBool,
    fail_catalog: AtomicBool,
    token_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_card(
        &self,
        id: &str,
        name: &str,
        expansion_name: Option<&str>,
        expansion_code: Option<&str>,
    ) {
        self.cards.lock().push(CatalogCard {
            id: id.to_string(),
            name: name.to_string(),
            expansion_name: expansion_name.map(str::to_string),
            expansion_code: expansion_code.map(str::to_string),
        });
    }

    pub fn reports(&self) -> Vec<NewJunkReport> {
        self.reports.lock().clone()
    }

    pub fn set_reports_unavailable(&self, unavailable: bool) {
        self.fail_reports.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_catalog_unavailable(&self, unavailable: bool) {
        self.fail_catalog.store(unavailable, Ordering::SeqCst);
    }

    pub fn token_queries(&self) -> usize {
        self.token_queries.load(Ordering::SeqCst)
    }

    fn check_reports(&self) -> Result<()> {
        if self.fail_reports.load(Ordering::SeqCst) {
            bail!("report store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn list_learned_tokens(&self) -> Result<Vec<String>> {
        self.check_reports()?;
        self.token_queries.fetch_add(1, Ordering::SeqCst);
        let tokens: BTreeSet<String> = self
            .reports
            .lock()
            .iter()
            .flat_map(|report| report.learned_tokens.iter().map(|t| t.to_lowercase()))
            .collect();
        Ok(tokens.into_iter().collect())
    }

    async fn list_seller_report_counts(&self, threshold: u32) -> Result<HashMap<String, u32>> {
        self.check_reports()?;
        let mut counts: HashMap<String, u32> = HashMap::new();
        for report in self.reports.lock().iter() {
            if let Some(seller) = report.seller_name.as_deref().filter(|s| !s.is_empty()) {
                *counts.entry(seller.to_string()).or_default() += 1;
            }
        }
        counts.retain(|_, count| *count >= threshold);
        Ok(counts)
    }

    async fn insert_report(&self, report: NewJunkReport) -> Result<bool> {
        self.check_reports()?;
        let mut reports = self.reports.lock();
        if reports.iter().any(|r| r.deal_id == report.deal_id) {
            return Ok(false);
        }
        reports.push(report);
        Ok(true)
    }
}

#[async_trait]
impl CatalogLookup for MemoryStore {
    async fn card_vocabulary(&self, card_id: &str) -> Result<Option<CardVocabulary>> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            bail!("catalog unavailable");
        }
        Ok(self
            .cards
            .lock()
            .iter()
            .find(|card| card.id == card_id)
            .map(|card| CardVocabulary {
                card_name: card.name.clone(),
                expansion_name: card.expansion_name.clone(),
                expansion_code: card.expansion_code.clone(),
            }))
    }

    async fn names_containing(&self, fragment: &str, limit: u32) -> Result<Vec<String>> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            bail!("catalog unavailable");
        }
        let needle = fragment.to_lowercase();
        Ok(self
            .cards
            .lock()
            .iter()
            .filter(|card| card.name.to_lowercase().contains(&needle))
            .take(limit as usize)
            .map(|card| card.name.clone())
            .collect())
    }
}
