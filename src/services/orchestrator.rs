//! Fact-check orchestration service
//!
//! **[FCE-ORC-010]** Drives one verification attempt per article:
//! SUBMITTING → POLLING → {COMPLETE | ERROR | TIMEOUT}. Submission errors
//! propagate to the caller (retryable by them); everything past dispatch
//! is unattended background work that always leaves a terminal, queryable
//! row instead of vanishing.
//!
//! **[FCE-ORC-020]** Each attempt is an independent unit of work: its own
//! spawned task, its own pool checkout per query, bounded by a semaphore.
//! Cancellation is cooperative: observed between polls, never mid-call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::{RwLock, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db;
use crate::db::fact_checks::TerminalOutcome;
use crate::error::{Error, Result};
use crate::models::{
    FactCheck, FactCheckStatus, FactCheckStatusView, FactCheckTicket, Verdict, VerdictPayload,
};
use crate::services::verdict_transform::{self, NEUTRAL_SCORE};
use crate::services::verification_client::{
    JobStatus, VerificationClient, VerificationRequest,
};

/// Poll-loop and worker-pool tuning
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Sleep between remote status checks
    pub poll_interval: Duration,
    /// Hard wall-clock deadline on the poll loop (not on submission)
    pub poll_timeout: Duration,
    /// Concurrent attempt bound across all articles
    pub max_concurrent_checks: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            poll_timeout: Duration::from_secs(120),
            max_concurrent_checks: 4,
        }
    }
}

/// Outcome of one poll loop, before persistence
enum PollOutcome {
    /// Remote job succeeded; raw payload still unparsed
    Completed(serde_json::Value),
    /// Remote service reported failure
    Failed(String),
    /// Deadline elapsed without a terminal remote status
    TimedOut,
    /// Local cancellation observed between polls
    Cancelled,
}

/// Orchestration service handle; cheap to clone, shared across tasks
#[derive(Clone)]
pub struct FactCheckOrchestrator {
    db: SqlitePool,
    client: Arc<dyn VerificationClient>,
    config: OrchestratorConfig,
    /// Bounds concurrent poll loops across all articles
    limiter: Arc<Semaphore>,
    /// Cancellation tokens for in-flight attempts, keyed by article id
    inflight: Arc<RwLock<HashMap<Uuid, CancellationToken>>>,
}

impl FactCheckOrchestrator {
    pub fn new(
        db: SqlitePool,
        client: Arc<dyn VerificationClient>,
        config: OrchestratorConfig,
    ) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_checks.max(1)));
        Self {
            db,
            client,
            config,
            limiter,
            inflight: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Submit an article for fact-checking
    ///
    /// **[FCE-ORC-010]** Guards, remote submit, PENDING insert, then
    /// fire-and-forget dispatch of the poll loop. The ticket returns
    /// immediately; terminal status arrives via the read surface. No
    /// retry on submission failure at this layer; that belongs to the
    /// caller.
    pub async fn submit(&self, article_id: Uuid) -> Result<FactCheckTicket> {
        // Advisory guard; the UNIQUE constraint on article_id is the
        // real one (see create below).
        if db::fact_checks::exists_for_article(&self.db, article_id).await? {
            return Err(Error::AlreadyFactChecked(article_id));
        }

        let article = db::articles::get_article(&self.db, article_id)
            .await?
            .ok_or(Error::ArticleNotFound(article_id))?;

        let request = VerificationRequest {
            url: article.url,
            title: article.title,
            content: article.content,
        };
        let job_id = self.client.submit_job(&request).await?;

        let fact_check = FactCheck::pending(article_id, job_id.clone());
        db::fact_checks::create(&self.db, &fact_check).await?;

        let token = CancellationToken::new();
        self.inflight.write().await.insert(article_id, token.clone());

        let ticket = FactCheckTicket {
            fact_check_id: fact_check.id,
            article_id,
            job_id: job_id.clone(),
            submitted_at: fact_check.created_at,
        };

        tracing::info!(
            article_id = %article_id,
            job_id = %job_id,
            fact_check_id = %fact_check.id,
            "Fact-check submitted, dispatching poll loop"
        );

        let orchestrator = self.clone();
        let fact_check_id = fact_check.id;
        tokio::spawn(async move {
            orchestrator
                .run_attempt(fact_check_id, article_id, job_id, token)
                .await;
        });

        Ok(ticket)
    }

    /// Load the fact-check row for an article
    pub async fn get_by_article(&self, article_id: Uuid) -> Result<Option<FactCheck>> {
        db::fact_checks::get_by_article_id(&self.db, article_id).await
    }

    /// Caller-facing status; pre-completion reads are never errors
    pub async fn get_status(&self, article_id: Uuid) -> Result<FactCheckStatusView> {
        let view = match db::fact_checks::get_by_article_id(&self.db, article_id).await? {
            None => FactCheckStatusView::NotSubmitted,
            Some(fc) if fc.is_terminal() => FactCheckStatusView::Terminal {
                verdict: fc.verdict.unwrap_or(Verdict::Error),
                credibility_score: fc.credibility_score.unwrap_or(NEUTRAL_SCORE),
                fact_checked_at: fc.fact_checked_at.unwrap_or(fc.updated_at),
            },
            Some(fc) => FactCheckStatusView::Pending { job_id: fc.job_id },
        };
        Ok(view)
    }

    /// Terminal fact-checks carrying the given verdict
    pub async fn list_by_verdict(&self, verdict: Verdict, limit: i64) -> Result<Vec<FactCheck>> {
        db::fact_checks::list_by_verdict(&self.db, verdict, limit).await
    }

    /// Terminal fact-checks at or above a credibility threshold
    pub async fn list_with_min_score(&self, min_score: i64, limit: i64) -> Result<Vec<FactCheck>> {
        db::fact_checks::list_with_min_score(&self.db, min_score, limit).await
    }

    /// Most recently completed fact-checks
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<FactCheck>> {
        db::fact_checks::list_recent(&self.db, limit).await
    }

    /// Cancel an in-flight attempt (best effort)
    ///
    /// Cooperative: the poll loop observes the token between iterations;
    /// a remote call already in flight finishes first. The remote job may
    /// keep running on the external side. The PENDING row is removed so
    /// the article can be resubmitted.
    pub async fn cancel(&self, article_id: Uuid) -> Result<()> {
        let tokens = self.inflight.read().await;
        match tokens.get(&article_id) {
            Some(token) => {
                token.cancel();
                tracing::info!(article_id = %article_id, "Fact-check cancellation requested");
                Ok(())
            }
            None => Err(Error::NotFound(format!(
                "No in-flight fact-check for article {}",
                article_id
            ))),
        }
    }

    /// Background body of one attempt: poll, then persist exactly one
    /// terminal outcome. Nothing escapes this function.
    async fn run_attempt(
        &self,
        fact_check_id: Uuid,
        article_id: Uuid,
        job_id: String,
        token: CancellationToken,
    ) {
        // Bound concurrent polling; permit held for the whole attempt.
        // acquire only fails if the semaphore is closed, which we never do.
        let _permit = match self.limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        let outcome = self.poll_until_terminal(&job_id, &token).await;

        // Deregister before the outcome becomes observable, so a prompt
        // resubmission cannot have its fresh token evicted by this
        // attempt's cleanup.
        self.inflight.write().await.remove(&article_id);

        match outcome {
            PollOutcome::Cancelled => {
                // Abandoned attempt records no result; dropping the
                // PENDING row frees the article for resubmission.
                if let Err(e) = db::fact_checks::delete(&self.db, fact_check_id).await {
                    tracing::warn!(
                        fact_check_id = %fact_check_id,
                        error = %e,
                        "Failed to remove cancelled pending fact-check"
                    );
                }
                tracing::info!(
                    article_id = %article_id,
                    job_id = %job_id,
                    "Fact-check attempt cancelled, no result recorded"
                );
            }
            PollOutcome::Completed(raw) => {
                let terminal = match serde_json::from_value::<VerdictPayload>(raw.clone()) {
                    Ok(payload) => {
                        let summary = verdict_transform::summarize_claims(&payload.claims);
                        tracing::info!(
                            article_id = %article_id,
                            job_id = %job_id,
                            verdict = summary.verdict.as_str(),
                            score = summary.score,
                            claims = summary.claims_analyzed(),
                            "Verification succeeded"
                        );
                        TerminalOutcome::complete(&summary, &payload, raw)
                    }
                    Err(e) => {
                        tracing::warn!(
                            article_id = %article_id,
                            job_id = %job_id,
                            error = %e,
                            "Verification payload unusable, recording ERROR"
                        );
                        TerminalOutcome::degraded(
                            FactCheckStatus::Error,
                            Some(format!("Unusable verdict payload: {}", e)),
                        )
                    }
                };
                self.persist_terminal(fact_check_id, article_id, terminal)
                    .await;
            }
            PollOutcome::Failed(reason) => {
                tracing::warn!(
                    article_id = %article_id,
                    job_id = %job_id,
                    reason = %reason,
                    "Remote verification failed, recording ERROR"
                );
                self.persist_terminal(
                    fact_check_id,
                    article_id,
                    TerminalOutcome::degraded(
                        FactCheckStatus::Error,
                        Some(format!("Verification service failure: {}", reason)),
                    ),
                )
                .await;
            }
            PollOutcome::TimedOut => {
                tracing::warn!(
                    article_id = %article_id,
                    job_id = %job_id,
                    timeout_secs = self.config.poll_timeout.as_secs(),
                    "Poll deadline elapsed, recording TIMEOUT"
                );
                self.persist_terminal(
                    fact_check_id,
                    article_id,
                    TerminalOutcome::degraded(
                        FactCheckStatus::Timeout,
                        Some("Verification did not finish before the poll deadline".to_string()),
                    ),
                )
                .await;
            }
        }
    }

    /// Query remote status every `poll_interval` until a terminal status,
    /// cancellation, or the `poll_timeout` deadline. Transient client
    /// errors are retried until the deadline.
    async fn poll_until_terminal(
        &self,
        job_id: &str,
        token: &CancellationToken,
    ) -> PollOutcome {
        let deadline = Instant::now() + self.config.poll_timeout;

        loop {
            if token.is_cancelled() {
                return PollOutcome::Cancelled;
            }

            match self.client.job_status(job_id).await {
                Ok(JobStatus::Succeeded { result }) => return PollOutcome::Completed(result),
                Ok(JobStatus::Failed { reason }) => return PollOutcome::Failed(reason),
                Ok(JobStatus::Running) => {
                    tracing::debug!(job_id = %job_id, "Verification job still running");
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %job_id,
                        error = %e,
                        "Status poll failed, retrying until deadline"
                    );
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return PollOutcome::TimedOut;
            }

            let sleep_for = self.config.poll_interval.min(deadline - now);
            tokio::select! {
                _ = token.cancelled() => return PollOutcome::Cancelled,
                _ = tokio::time::sleep(sleep_for) => {}
            }

            if Instant::now() >= deadline {
                return PollOutcome::TimedOut;
            }
        }
    }

    /// Persist one terminal outcome. A persistence fault on a COMPLETE
    /// write is downgraded to an ERROR row; past that, logging is all
    /// that's left.
    async fn persist_terminal(
        &self,
        fact_check_id: Uuid,
        article_id: Uuid,
        outcome: TerminalOutcome,
    ) {
        let status = outcome.status;
        if let Err(e) = db::fact_checks::finalize(&self.db, fact_check_id, &outcome).await {
            tracing::error!(
                fact_check_id = %fact_check_id,
                article_id = %article_id,
                error = %e,
                "Failed to persist terminal fact-check outcome"
            );

            if status != FactCheckStatus::Error {
                let fallback = TerminalOutcome::degraded(
                    FactCheckStatus::Error,
                    Some(format!("Result persistence failed: {}", e)),
                );
                if let Err(e2) =
                    db::fact_checks::finalize(&self.db, fact_check_id, &fallback).await
                {
                    tracing::error!(
                        fact_check_id = %fact_check_id,
                        error = %e2,
                        "Fallback ERROR persistence also failed, row left pending"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::verification_client::VerificationError;
    use async_trait::async_trait;

    struct NeverCalledClient;

    #[async_trait]
    impl VerificationClient for NeverCalledClient {
        async fn submit_job(
            &self,
            _request: &VerificationRequest,
        ) -> std::result::Result<String, VerificationError> {
            panic!("submit_job must not be reached");
        }

        async fn job_status(
            &self,
            _job_id: &str,
        ) -> std::result::Result<JobStatus, VerificationError> {
            panic!("job_status must not be reached");
        }
    }

    fn orchestrator(pool: SqlitePool) -> FactCheckOrchestrator {
        FactCheckOrchestrator::new(
            pool,
            Arc::new(NeverCalledClient),
            OrchestratorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_missing_article_fails_before_remote_call() {
        let pool = db::init_memory_pool().await.unwrap();
        let service = orchestrator(pool);

        let missing = Uuid::new_v4();
        let result = service.submit(missing).await;
        assert!(matches!(result, Err(Error::ArticleNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_status_of_unknown_article_is_not_submitted() {
        let pool = db::init_memory_pool().await.unwrap();
        let service = orchestrator(pool);

        let view = service.get_status(Uuid::new_v4()).await.unwrap();
        assert!(matches!(view, FactCheckStatusView::NotSubmitted));
    }

    #[tokio::test]
    async fn test_cancel_without_inflight_attempt_is_not_found() {
        let pool = db::init_memory_pool().await.unwrap();
        let service = orchestrator(pool);

        let result = service.cancel(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_default_config_values() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.poll_timeout, Duration::from_secs(120));
        assert_eq!(config.max_concurrent_checks, 4);
    }
}
