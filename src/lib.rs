//! factcheck-engine: fact-check orchestration for the news backend
//!
//! Drives asynchronous claim-verification jobs against an external
//! service to a terminal outcome, normalizes heterogeneous verdict
//! payloads into a single 0-100 credibility score, persists exactly one
//! fact-check record per article, and keeps the article's denormalized
//! credibility fields in sync with the source-of-truth row.
//!
//! The ingestion pipeline (trigger adapter) calls
//! [`FactCheckOrchestrator::submit`] after creating an article and gets a
//! ticket back immediately; the poll loop runs as a background task and
//! always leaves a queryable terminal row (COMPLETE, ERROR, or TIMEOUT).
//! `AlreadyFactChecked` on resubmission is a non-fatal no-op for the
//! trigger side.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use models::{
    Article, ClaimResult, ClaimVerdict, FactCheck, FactCheckStatus, FactCheckStatusView,
    FactCheckTicket, SourceConsensus, Verdict, VerdictPayload,
};
pub use services::{
    FactCheckOrchestrator, HttpVerificationClient, JobStatus, OrchestratorConfig,
    VerificationClient, VerificationError, VerificationRequest,
};
