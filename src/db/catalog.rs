use anyhow::Result;
use async_trait::async_trait;
use sqlx::{query_as, sqlite::SqlitePool};

use crate::{domain::CardVocabulary, signals::store::CatalogLookup};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogLookup for CatalogRepository {
    async fn card_vocabulary(&self, card_id: &str) -> Result<Option<CardVocabulary>> {
        let row: Option<(String, Option<String>, Option<String>)> = query_as(
            r#"SELECT c.name, e.name, e.code
                FROM cards c
                LEFT JOIN expansions e ON e.id = c.expansion_id
                WHERE c.id = ?1"#,
        )
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(card_name, expansion_name, expansion_code)| CardVocabulary {
            card_name,
            expansion_name,
            expansion_code,
        }))
    }

    async fn names_containing(&self, fragment: &str, limit: u32) -> Result<Vec<String>> {
        // instr keeps '%' and '_' in the fragment literal
        let rows: Vec<(String,)> = query_as(
            r#"SELECT name FROM cards WHERE instr(lower(name), lower(?1)) > 0 LIMIT ?2"#,
        )
        .bind(fragment)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
