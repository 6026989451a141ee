use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use anyhow::Result;
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;

use super::store::CatalogLookup;

const MIN_TOKEN_CHARS: usize = 3;

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+([/.\-]\d+)?$").expect("valid numeric regex"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // condition
        "mint", "near", "excellent", "good", "played", "lightly", "moderately", "heavily",
        "damaged", "dmg", "used", "unplayed", "pack", "fresh", "graded", "ungraded", "raw",
        "gem", "pristine", "condition",
        // grading companies
        "psa", "bgs", "cgc", "sgc", "beckett", "ace", "tag",
        // rarity and variants
        "holo", "reverse", "rare", "uncommon", "common", "ultra", "secret", "full", "art",
        "alt", "alternate", "illustration", "special", "promo", "foil", "shadowless",
        "first", "1st", "edition", "unlimited", "rainbow", "gold", "shiny", "trainer",
        "gallery", "vmax", "vstar", "team", "black", "star", "stamped", "stamp",
        // shipping and listing boilerplate
        "free", "fast", "shipping", "ship", "ships", "postage", "post", "tracked",
        "delivery", "dispatch", "same", "day", "next", "sale", "offer", "offers",
        "bundle", "lot", "job",
        // generic product words
        "the", "and", "for", "with", "card", "cards", "pokemon", "pokémon", "tcg", "ccg",
        "single", "singles", "english", "japanese", "korean", "chinese", "new", "sealed",
        "official", "genuine", "authentic", "collection", "collectible", "nintendo",
        "game", "freak", "wotc",
    ]
    .into_iter()
    .collect()
});

/// Derives novel vocabulary from a junk-reported listing title.
pub struct TokenExtractor {
    catalog: Arc<dyn CatalogLookup>,
    lookup_limit: u32,
}

impl TokenExtractor {
    pub fn new(catalog: Arc<dyn CatalogLookup>, lookup_limit: u32) -> Self {
        Self {
            catalog,
            lookup_limit,
        }
    }

    /// Tokens of `cleaned_title` that are not stop words, numbers or catalog words,
    /// in first-seen order. Catalog failures degrade to no catalog filtering.
    pub async fn extract(&self, cleaned_title: &str, card_id: Option<&str>) -> Vec<String> {
        let candidates: Vec<String> = cleaned_title
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|token| !is_stop_word(token))
            .filter(|token| !is_numeric(token))
            .collect();
        if candidates.is_empty() {
            return candidates;
        }

        let excluded = match self.catalog_vocabulary(&candidates, card_id).await {
            Ok(words) => words,
            Err(err) => {
                tracing::warn!(
                    target: "signals",
                    error = %err,
                    card_id = card_id.unwrap_or("-"),
                    "catalog lookup failed; extracting without catalog exclusions"
                );
                HashSet::new()
            }
        };

        candidates
            .into_iter()
            .filter(|token| !excluded.contains(token))
            .collect()
    }

    async fn catalog_vocabulary(
        &self,
        candidates: &[String],
        card_id: Option<&str>,
    ) -> Result<HashSet<String>> {
        let mut words = HashSet::new();

        if let Some(card_id) = card_id.filter(|id| !id.is_empty()) {
            if let Some(vocab) = self.catalog.card_vocabulary(card_id).await? {
                for name in vocab.names() {
                    words.extend(catalog_words(name));
                }
            }
        }

        let distinct: BTreeSet<&str> = candidates
            .iter()
            .map(String::as_str)
            .filter(|token| !words.contains(*token))
            .collect();
        let lookups = distinct
            .into_iter()
            .map(|token| self.catalog.names_containing(token, self.lookup_limit));
        for names in try_join_all(lookups).await? {
            for name in &names {
                words.extend(catalog_words(name));
            }
        }

        Ok(words)
    }
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

pub fn is_numeric(token: &str) -> bool {
    NUMERIC_REGEX.is_match(token)
}

fn catalog_words(name: &str) -> impl Iterator<Item = String> + '_ {
    name.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
}
