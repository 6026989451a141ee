use std::{path::Path, str::FromStr, time::Duration};

use anyhow::Result;
use sqlx::{
    query,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};

pub mod catalog;
pub mod reports;

pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    query(
        r#"
        CREATE TABLE IF NOT EXISTS junk_reports (
            deal_id TEXT PRIMARY KEY,
            ebay_item_id TEXT NOT NULL,
            ebay_title TEXT NOT NULL,
            seller_name TEXT,
            learned_tokens TEXT NOT NULL DEFAULT '[]',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    query(r#"CREATE INDEX IF NOT EXISTS idx_junk_reports_seller ON junk_reports (seller_name)"#)
        .execute(pool)
        .await?;

    query(
        r#"
        CREATE TABLE IF NOT EXISTS expansions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            expansion_id TEXT REFERENCES expansions (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!(target: "db", "schema ready");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("valid memory url");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("memory pool");
    migrate(&pool).await.expect("migrations");
    pool
}
