//! Fact-check store
//!
//! **[FCE-DB-020]** Persistence for fact-check records. The UNIQUE
//! constraint on `article_id` is the real guarantee behind "at most one
//! fact-check per article"; the service-level existence check is advisory.
//! Terminal rows are immutable: `finalize` only matches PENDING rows, so a
//! second terminal write can never overwrite a verdict.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{FactCheck, FactCheckStatus, SourceConsensus, Verdict, VerdictPayload};
use crate::services::verdict_transform::{VerdictSummary, NEUTRAL_SCORE};

/// Terminal fields written exactly once per fact-check row
#[derive(Debug, Clone)]
pub struct TerminalOutcome {
    pub status: FactCheckStatus,
    pub verdict: Verdict,
    pub credibility_score: i64,
    pub confidence: Option<f64>,
    pub summary: Option<String>,
    pub claims_analyzed: i64,
    pub claims_true: i64,
    pub claims_false: i64,
    pub claims_misleading: i64,
    pub claims_unverified: i64,
    pub validation_results: Option<serde_json::Value>,
    pub num_sources: Option<i64>,
    pub source_consensus: Option<SourceConsensus>,
    pub processing_time_seconds: Option<f64>,
    pub fact_checked_at: DateTime<Utc>,
}

impl TerminalOutcome {
    /// Successful verification: transformed verdict summary plus the raw
    /// payload retained for evidence queries
    pub fn complete(
        summary: &VerdictSummary,
        payload: &VerdictPayload,
        raw_payload: serde_json::Value,
    ) -> Self {
        Self {
            status: FactCheckStatus::Complete,
            verdict: summary.verdict,
            credibility_score: summary.score,
            confidence: payload.confidence,
            summary: payload.summary.clone(),
            claims_analyzed: summary.claims_analyzed(),
            claims_true: summary.claims_true(),
            claims_false: summary.claims_false(),
            claims_misleading: summary.claims_misleading(),
            claims_unverified: summary.claims_unverified(),
            validation_results: Some(raw_payload),
            num_sources: payload.num_sources,
            source_consensus: payload.source_consensus,
            processing_time_seconds: payload.processing_time_seconds,
            fact_checked_at: Utc::now(),
        }
    }

    /// Degraded terminal state (ERROR or TIMEOUT): neutral score, zero
    /// counts, optional diagnostic summary. Still a real row so the
    /// already-fact-checked guard holds and the article is not silently
    /// resubmitted forever.
    pub fn degraded(status: FactCheckStatus, summary: Option<String>) -> Self {
        debug_assert!(matches!(
            status,
            FactCheckStatus::Error | FactCheckStatus::Timeout
        ));
        let verdict = match status {
            FactCheckStatus::Timeout => Verdict::Timeout,
            _ => Verdict::Error,
        };
        Self {
            status,
            verdict,
            credibility_score: NEUTRAL_SCORE,
            confidence: None,
            summary,
            claims_analyzed: 0,
            claims_true: 0,
            claims_false: 0,
            claims_misleading: 0,
            claims_unverified: 0,
            validation_results: None,
            num_sources: None,
            source_consensus: None,
            processing_time_seconds: None,
            fact_checked_at: Utc::now(),
        }
    }
}

/// Indexed existence probe used by the submission guard
pub async fn exists_for_article(pool: &SqlitePool, article_id: Uuid) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM fact_checks WHERE article_id = ?")
        .bind(article_id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Insert a fact-check row
///
/// **[FCE-DB-020]** A uniqueness violation on `article_id` maps to
/// `Error::DuplicateFactCheck`; this is where a concurrent submission
/// race for the same article is lost safely.
pub async fn create(pool: &SqlitePool, fact_check: &FactCheck) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO fact_checks (
            id, article_id, job_id, status,
            verdict, credibility_score, confidence, summary,
            claims_analyzed, claims_true, claims_false,
            claims_misleading, claims_unverified,
            validation_results, num_sources, source_consensus,
            processing_time_seconds, fact_checked_at,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(fact_check.id.to_string())
    .bind(fact_check.article_id.to_string())
    .bind(&fact_check.job_id)
    .bind(fact_check.status.as_str())
    .bind(fact_check.verdict.map(|v| v.as_str()))
    .bind(fact_check.credibility_score)
    .bind(fact_check.confidence)
    .bind(&fact_check.summary)
    .bind(fact_check.claims_analyzed)
    .bind(fact_check.claims_true)
    .bind(fact_check.claims_false)
    .bind(fact_check.claims_misleading)
    .bind(fact_check.claims_unverified)
    .bind(
        fact_check
            .validation_results
            .as_ref()
            .map(|v| v.to_string()),
    )
    .bind(fact_check.num_sources)
    .bind(fact_check.source_consensus.map(|c| c.as_str()))
    .bind(fact_check.processing_time_seconds)
    .bind(fact_check.fact_checked_at)
    .bind(fact_check.created_at)
    .bind(fact_check.updated_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            if e.as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation())
            {
                Err(Error::DuplicateFactCheck(fact_check.article_id))
            } else {
                Err(e.into())
            }
        }
    }
}

/// Transition a PENDING row to its terminal state and sync the article's
/// denormalized fields, in one transaction
///
/// **[FCE-DB-030]** The `status = 'PENDING'` guard enforces terminal
/// immutability at the storage layer: zero rows matched means the row is
/// missing or already terminal, reported as `Error::NotFound`.
pub async fn finalize(pool: &SqlitePool, id: Uuid, outcome: &TerminalOutcome) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE fact_checks
        SET status = ?,
            verdict = ?,
            credibility_score = ?,
            confidence = ?,
            summary = ?,
            claims_analyzed = ?,
            claims_true = ?,
            claims_false = ?,
            claims_misleading = ?,
            claims_unverified = ?,
            validation_results = ?,
            num_sources = ?,
            source_consensus = ?,
            processing_time_seconds = ?,
            fact_checked_at = ?,
            updated_at = ?
        WHERE id = ? AND status = 'PENDING'
        "#,
    )
    .bind(outcome.status.as_str())
    .bind(outcome.verdict.as_str())
    .bind(outcome.credibility_score)
    .bind(outcome.confidence)
    .bind(&outcome.summary)
    .bind(outcome.claims_analyzed)
    .bind(outcome.claims_true)
    .bind(outcome.claims_false)
    .bind(outcome.claims_misleading)
    .bind(outcome.claims_unverified)
    .bind(outcome.validation_results.as_ref().map(|v| v.to_string()))
    .bind(outcome.num_sources)
    .bind(outcome.source_consensus.map(|c| c.as_str()))
    .bind(outcome.processing_time_seconds)
    .bind(outcome.fact_checked_at)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Pending fact-check {} (missing or already terminal)",
            id
        )));
    }

    let article_id: String = sqlx::query("SELECT article_id FROM fact_checks WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await?
        .get("article_id");
    let article_id = Uuid::parse_str(&article_id)
        .map_err(|e| Error::Internal(format!("Bad article id on fact-check {}: {}", id, e)))?;

    crate::db::articles::sync_credibility(
        &mut tx,
        article_id,
        outcome.credibility_score,
        outcome.verdict.as_str(),
        outcome.fact_checked_at,
    )
    .await?;

    tx.commit().await?;

    Ok(())
}

/// Load fact-check by id
pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<FactCheck>> {
    let row = sqlx::query(&select_query("WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| map_fact_check(&r)).transpose()
}

/// Load fact-check by owning article
pub async fn get_by_article_id(pool: &SqlitePool, article_id: Uuid) -> Result<Option<FactCheck>> {
    let row = sqlx::query(&select_query("WHERE article_id = ?"))
        .bind(article_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| map_fact_check(&r)).transpose()
}

/// Load fact-check by remote job id
pub async fn get_by_job_id(pool: &SqlitePool, job_id: &str) -> Result<Option<FactCheck>> {
    let row = sqlx::query(&select_query("WHERE job_id = ?"))
        .bind(job_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| map_fact_check(&r)).transpose()
}

/// Terminal fact-checks carrying the given verdict, most recent first
pub async fn list_by_verdict(
    pool: &SqlitePool,
    verdict: Verdict,
    limit: i64,
) -> Result<Vec<FactCheck>> {
    let rows = sqlx::query(&select_query(
        "WHERE status != 'PENDING' AND verdict = ? \
         ORDER BY fact_checked_at DESC LIMIT ?",
    ))
    .bind(verdict.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_fact_check).collect()
}

/// Terminal fact-checks at or above a credibility threshold
pub async fn list_with_min_score(
    pool: &SqlitePool,
    min_score: i64,
    limit: i64,
) -> Result<Vec<FactCheck>> {
    let rows = sqlx::query(&select_query(
        "WHERE status != 'PENDING' AND credibility_score >= ? \
         ORDER BY credibility_score DESC, fact_checked_at DESC LIMIT ?",
    ))
    .bind(min_score)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_fact_check).collect()
}

/// Most recently completed fact-checks
pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<FactCheck>> {
    let rows = sqlx::query(&select_query(
        "WHERE fact_checked_at IS NOT NULL ORDER BY fact_checked_at DESC LIMIT ?",
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_fact_check).collect()
}

/// Delete fact-check by id (the cascade path goes through the article)
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM fact_checks WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Fact-check {}", id)));
    }

    Ok(())
}

fn select_query(clause: &str) -> String {
    format!(
        r#"
        SELECT id, article_id, job_id, status,
               verdict, credibility_score, confidence, summary,
               claims_analyzed, claims_true, claims_false,
               claims_misleading, claims_unverified,
               validation_results, num_sources, source_consensus,
               processing_time_seconds, fact_checked_at,
               created_at, updated_at
        FROM fact_checks
        {}
        "#,
        clause
    )
}

fn map_fact_check(row: &SqliteRow) -> Result<FactCheck> {
    let id_str: String = row.get("id");
    let article_id_str: String = row.get("article_id");
    let status_str: String = row.get("status");
    let verdict_str: Option<String> = row.get("verdict");
    let consensus_str: Option<String> = row.get("source_consensus");
    let validation_str: Option<String> = row.get("validation_results");

    Ok(FactCheck {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Bad fact-check id: {}", e)))?,
        article_id: Uuid::parse_str(&article_id_str)
            .map_err(|e| Error::Internal(format!("Bad article id: {}", e)))?,
        job_id: row.get("job_id"),
        status: FactCheckStatus::parse(&status_str)
            .ok_or_else(|| Error::Internal(format!("Bad status: {}", status_str)))?,
        verdict: verdict_str
            .map(|s| {
                Verdict::parse(&s).ok_or_else(|| Error::Internal(format!("Bad verdict: {}", s)))
            })
            .transpose()?,
        credibility_score: row.get("credibility_score"),
        confidence: row.get("confidence"),
        summary: row.get("summary"),
        claims_analyzed: row.get("claims_analyzed"),
        claims_true: row.get("claims_true"),
        claims_false: row.get("claims_false"),
        claims_misleading: row.get("claims_misleading"),
        claims_unverified: row.get("claims_unverified"),
        validation_results: validation_str
            .map(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| Error::Internal(format!("Bad validation_results: {}", e)))
            })
            .transpose()?,
        num_sources: row.get("num_sources"),
        source_consensus: consensus_str
            .map(|s| {
                SourceConsensus::parse(&s)
                    .ok_or_else(|| Error::Internal(format!("Bad source_consensus: {}", s)))
            })
            .transpose()?,
        processing_time_seconds: row.get("processing_time_seconds"),
        fact_checked_at: row.get("fact_checked_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
