//! Shared test helpers: scripted verification client and engine setup
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use factcheck_engine::db;
use factcheck_engine::models::Article;
use factcheck_engine::services::verification_client::{
    JobStatus, VerificationClient, VerificationError, VerificationRequest,
};
use factcheck_engine::{FactCheck, FactCheckOrchestrator, OrchestratorConfig};

/// Verification client with a scripted status sequence.
///
/// `job_status` pops scripted responses in order, then keeps returning the
/// fallback status (Running unless configured otherwise) once the script
/// is exhausted.
pub struct ScriptedClient {
    fail_submit: bool,
    job_counter: AtomicUsize,
    responses: Mutex<VecDeque<Result<JobStatus, VerificationError>>>,
    fallback: JobStatus,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn with_responses(responses: Vec<Result<JobStatus, VerificationError>>) -> Self {
        Self {
            fail_submit: false,
            job_counter: AtomicUsize::new(0),
            responses: Mutex::new(responses.into()),
            fallback: JobStatus::Running,
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_statuses(statuses: Vec<JobStatus>) -> Self {
        Self::with_responses(statuses.into_iter().map(Ok).collect())
    }

    /// Every poll reports the job still running (deadline/cancel tests)
    pub fn always_running() -> Self {
        Self::with_statuses(Vec::new())
    }

    /// Every poll immediately reports success with the given payload
    pub fn always_succeeding(result: serde_json::Value) -> Self {
        let mut client = Self::with_statuses(Vec::new());
        client.fallback = JobStatus::Succeeded { result };
        client
    }

    /// Remote submission itself fails
    pub fn failing_submit() -> Self {
        let mut client = Self::with_statuses(Vec::new());
        client.fail_submit = true;
        client
    }
}

#[async_trait]
impl VerificationClient for ScriptedClient {
    async fn submit_job(
        &self,
        _request: &VerificationRequest,
    ) -> Result<String, VerificationError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit {
            return Err(VerificationError::Network("connection refused".to_string()));
        }
        let n = self.job_counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("job-{}", n))
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatus, VerificationError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Tight poll loop timings so tests finish quickly
pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_secs(5),
        max_concurrent_checks: 4,
    }
}

/// File-backed engine so concurrent attempts get real pool connections
pub async fn engine_with_client(
    client: Arc<ScriptedClient>,
    config: OrchestratorConfig,
) -> (FactCheckOrchestrator, SqlitePool, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let pool = db::init_database_pool(&dir.path().join("factcheck.db"))
        .await
        .expect("init pool");
    let orchestrator = FactCheckOrchestrator::new(pool.clone(), client, config);
    (orchestrator, pool, dir)
}

pub async fn insert_test_article(pool: &SqlitePool) -> Article {
    let article = Article::new(
        "Breaking story".to_string(),
        format!("https://news.example.com/{}", Uuid::new_v4()),
        Some("Full article body".to_string()),
    );
    db::articles::insert_article(pool, &article)
        .await
        .expect("insert article");
    article
}

/// Claims payload in the verification service's wire shape
pub fn claims_payload(claims: &[(&str, Option<f64>)]) -> serde_json::Value {
    let claims: Vec<serde_json::Value> = claims
        .iter()
        .map(|(verdict, confidence)| match confidence {
            Some(c) => serde_json::json!({"verdict": verdict, "confidence": c}),
            None => serde_json::json!({"verdict": verdict}),
        })
        .collect();
    serde_json::json!({ "claims": claims })
}

/// Poll the read surface until the background attempt reaches a terminal
/// row, panicking after `deadline`
pub async fn wait_for_terminal(
    orchestrator: &FactCheckOrchestrator,
    article_id: Uuid,
    deadline: Duration,
) -> FactCheck {
    let start = std::time::Instant::now();
    loop {
        if let Some(fc) = orchestrator
            .get_by_article(article_id)
            .await
            .expect("read fact-check")
        {
            if fc.is_terminal() {
                return fc;
            }
        }
        assert!(
            start.elapsed() < deadline,
            "fact-check for article {} never reached a terminal state",
            article_id
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until no fact-check row exists for the article (cancellation path)
pub async fn wait_for_removed(
    orchestrator: &FactCheckOrchestrator,
    article_id: Uuid,
    deadline: Duration,
) {
    let start = std::time::Instant::now();
    loop {
        if orchestrator
            .get_by_article(article_id)
            .await
            .expect("read fact-check")
            .is_none()
        {
            return;
        }
        assert!(
            start.elapsed() < deadline,
            "cancelled fact-check row for article {} was never removed",
            article_id
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
