//! Error types for the fact-check engine
//!
//! **[FCE-ERR-010]** Submission-path errors propagate to the caller;
//! poll-loop errors are absorbed into terminal ERROR/TIMEOUT rows by the
//! orchestrator and never surface here.

use thiserror::Error;
use uuid::Uuid;

use crate::services::verification_client::VerificationError;

/// Common result type for fact-check engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error taxonomy
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Article referenced by a submission does not exist
    #[error("Article not found: {0}")]
    ArticleNotFound(Uuid),

    /// A fact-check already exists (or is in flight) for this article
    #[error("Article already fact-checked: {0}")]
    AlreadyFactChecked(Uuid),

    /// Storage-level uniqueness violation on article_id.
    /// Defense in depth against submissions racing past the advisory
    /// existence check.
    #[error("Duplicate fact-check for article: {0}")]
    DuplicateFactCheck(Uuid),

    /// Remote submit call failed; the caller may retry
    #[error("Verification submission failed: {0}")]
    SubmissionFailed(#[from] VerificationError),

    /// Update/delete/cancel targeted a record that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation (e.g. unreadable stored enum text)
    #[error("Internal error: {0}")]
    Internal(String),
}
