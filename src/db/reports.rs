use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    query, query_as,
    sqlite::{SqlitePool, SqliteRow},
    FromRow, Row,
};

use crate::{
    domain::{JunkReportRow, NewJunkReport},
    signals::store::ReportStore,
};

#[derive(Clone)]
pub struct JunkReportRepository {
    pool: SqlitePool,
}

impl JunkReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn recent(&self, limit: u32) -> Result<Vec<JunkReportRow>> {
        let rows = query_as::<_, JunkReportRow>(
            r#"SELECT deal_id, ebay_item_id, ebay_title, seller_name, learned_tokens, created_at
                FROM junk_reports ORDER BY created_at DESC LIMIT ?1"#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = query_as(r#"SELECT COUNT(*) FROM junk_reports"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl ReportStore for JunkReportRepository {
    async fn list_learned_tokens(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = query_as(
            r#"SELECT DISTINCT lower(token.value)
                FROM junk_reports, json_each(junk_reports.learned_tokens) AS token"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(token,)| token).collect())
    }

    async fn list_seller_report_counts(&self, threshold: u32) -> Result<HashMap<String, u32>> {
        let rows: Vec<(String, i64)> = query_as(
            r#"SELECT seller_name, COUNT(*) FROM junk_reports
                WHERE seller_name IS NOT NULL AND seller_name <> ''
                GROUP BY seller_name
                HAVING COUNT(*) >= ?1"#,
        )
        .bind(i64::from(threshold))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(seller, count)| (seller, u32::try_from(count).unwrap_or(u32::MAX)))
            .collect())
    }

    async fn insert_report(&self, report: NewJunkReport) -> Result<bool> {
        let tokens = serde_json::to_string(&report.learned_tokens)?;
        let affected = query(
            r#"INSERT INTO junk_reports (deal_id, ebay_item_id, ebay_title, seller_name, learned_tokens)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (deal_id) DO NOTHING"#,
        )
        .bind(report.deal_id)
        .bind(report.listing_id)
        .bind(report.raw_title)
        .bind(report.seller_name)
        .bind(tokens)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for JunkReportRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let tokens: String = row.try_get("learned_tokens")?;
        let learned_tokens =
            serde_json::from_str(&tokens).map_err(|err| sqlx::Error::ColumnDecode {
                index: "learned_tokens".to_string(),
                source: Box::new(err),
            })?;
        Ok(Self {
            deal_id: row.try_get("deal_id")?,
            listing_id: row.try_get("ebay_item_id")?,
            raw_title: row.try_get("ebay_title")?,
            seller_name: row.try_get("seller_name")?,
            learned_tokens,
            created_at: row.try_get("created_at")?,
        })
    }
}
