//! Database access for the fact-check engine
//!
//! **[FCE-DB-010]** SQLite via sqlx. Every concurrent attempt checks out
//! its own connection from the pool; no connection handle is shared across
//! dispatched units of work. Foreign keys are enabled on every connection
//! so that deleting an article cascades to its fact-check row.

pub mod articles;
pub mod fact_checks;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize database connection pool
///
/// Creates the database file (and parent directory) if missing and runs
/// table initialization.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            crate::error::Error::Config(format!("Failed to create database directory: {}", e))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    tracing::debug!(path = %db_path.display(), "Connecting to database");

    let pool = SqlitePool::connect_with(options).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize a single-connection in-memory pool
///
/// For tests and ephemeral use; a shared on-disk pool should go through
/// [`init_database_pool`].
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(crate::error::Error::Database)?
        .foreign_keys(true);

    // One connection only: each new connection would get its own
    // independent in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create engine tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            content TEXT,
            credibility_score INTEGER,
            fact_check_verdict TEXT,
            fact_checked_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fact_checks (
            id TEXT PRIMARY KEY,
            article_id TEXT NOT NULL UNIQUE REFERENCES articles(id) ON DELETE CASCADE,
            job_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            verdict TEXT,
            credibility_score INTEGER,
            confidence REAL,
            summary TEXT,
            claims_analyzed INTEGER NOT NULL DEFAULT 0,
            claims_true INTEGER NOT NULL DEFAULT 0,
            claims_false INTEGER NOT NULL DEFAULT 0,
            claims_misleading INTEGER NOT NULL DEFAULT 0,
            claims_unverified INTEGER NOT NULL DEFAULT 0,
            validation_results TEXT,
            num_sources INTEGER,
            source_consensus TEXT,
            processing_time_seconds REAL,
            fact_checked_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_fact_checks_job_id ON fact_checks(job_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_fact_checks_verdict ON fact_checks(verdict)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_fact_checks_score ON fact_checks(credibility_score)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_fact_checks_checked_at ON fact_checks(fact_checked_at)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (articles, fact_checks)");

    Ok(())
}
