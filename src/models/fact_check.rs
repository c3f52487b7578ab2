//! Fact-check record and verdict state machine
//!
//! **[FCE-WF-010]** A fact-check attempt progresses
//! SUBMITTING → POLLING → {COMPLETE | ERROR | TIMEOUT}. Only the PENDING
//! row (inserted once the remote job is accepted) and the terminal states
//! are persisted; the status column is explicit, never inferred from
//! column nullability. Once terminal, a row is immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate verdict label for an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    Misleading,
    Unverified,
    Misinformation,
    /// Remote service failed or the payload was unusable
    Error,
    /// Poll deadline elapsed without a terminal remote status
    Timeout,
}

impl Verdict {
    /// Stable text form used for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::True => "TRUE",
            Verdict::MostlyTrue => "MOSTLY_TRUE",
            Verdict::Mixed => "MIXED",
            Verdict::MostlyFalse => "MOSTLY_FALSE",
            Verdict::False => "FALSE",
            Verdict::Misleading => "MISLEADING",
            Verdict::Unverified => "UNVERIFIED",
            Verdict::Misinformation => "MISINFORMATION",
            Verdict::Error => "ERROR",
            Verdict::Timeout => "TIMEOUT",
        }
    }

    /// Parse the database text form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRUE" => Some(Verdict::True),
            "MOSTLY_TRUE" => Some(Verdict::MostlyTrue),
            "MIXED" => Some(Verdict::Mixed),
            "MOSTLY_FALSE" => Some(Verdict::MostlyFalse),
            "FALSE" => Some(Verdict::False),
            "MISLEADING" => Some(Verdict::Misleading),
            "UNVERIFIED" => Some(Verdict::Unverified),
            "MISINFORMATION" => Some(Verdict::Misinformation),
            "ERROR" => Some(Verdict::Error),
            "TIMEOUT" => Some(Verdict::Timeout),
            _ => None,
        }
    }
}

/// Claim-level verdict as reported by the verification service
///
/// Claims never carry ERROR/TIMEOUT; those are attempt-level outcomes.
/// An unrecognized label fails deserialization of the whole payload, which
/// the orchestrator downgrades to a terminal ERROR row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimVerdict {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    Misleading,
    Unverified,
    Misinformation,
}

impl ClaimVerdict {
    /// Corresponding aggregate-level label
    pub fn as_verdict(&self) -> Verdict {
        match self {
            ClaimVerdict::True => Verdict::True,
            ClaimVerdict::MostlyTrue => Verdict::MostlyTrue,
            ClaimVerdict::Mixed => Verdict::Mixed,
            ClaimVerdict::MostlyFalse => Verdict::MostlyFalse,
            ClaimVerdict::False => Verdict::False,
            ClaimVerdict::Misleading => Verdict::Misleading,
            ClaimVerdict::Unverified => Verdict::Unverified,
            ClaimVerdict::Misinformation => Verdict::Misinformation,
        }
    }
}

/// **[FCE-WF-010]** Persisted attempt status (explicit, queryable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FactCheckStatus {
    /// Remote job accepted, poll loop running
    Pending,
    /// Remote verdict received and transformed
    Complete,
    /// Remote failure, malformed payload, or persistence fault
    Error,
    /// Poll deadline elapsed
    Timeout,
}

impl FactCheckStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FactCheckStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactCheckStatus::Pending => "PENDING",
            FactCheckStatus::Complete => "COMPLETE",
            FactCheckStatus::Error => "ERROR",
            FactCheckStatus::Timeout => "TIMEOUT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(FactCheckStatus::Pending),
            "COMPLETE" => Some(FactCheckStatus::Complete),
            "ERROR" => Some(FactCheckStatus::Error),
            "TIMEOUT" => Some(FactCheckStatus::Timeout),
            _ => None,
        }
    }
}

/// How strongly independent sources agree with the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceConsensus {
    StrongAgreement,
    ModerateAgreement,
    Mixed,
    WeakAgreement,
}

impl SourceConsensus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceConsensus::StrongAgreement => "STRONG_AGREEMENT",
            SourceConsensus::ModerateAgreement => "MODERATE_AGREEMENT",
            SourceConsensus::Mixed => "MIXED",
            SourceConsensus::WeakAgreement => "WEAK_AGREEMENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STRONG_AGREEMENT" => Some(SourceConsensus::StrongAgreement),
            "MODERATE_AGREEMENT" => Some(SourceConsensus::ModerateAgreement),
            "MIXED" => Some(SourceConsensus::Mixed),
            "WEAK_AGREEMENT" => Some(SourceConsensus::WeakAgreement),
            _ => None,
        }
    }
}

/// One per-claim result inside the raw verification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResult {
    /// Claim text as extracted by the remote service
    #[serde(default)]
    pub claim: Option<String>,
    pub verdict: ClaimVerdict,
    /// Reported confidence 0.0-1.0; weight defaults to 1.0 when absent
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Per-claim evidence and citations, opaque to the engine
    #[serde(default)]
    pub evidence: Option<serde_json::Value>,
}

/// Raw verdict payload returned by the verification service on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictPayload {
    #[serde(default)]
    pub claims: Vec<ClaimResult>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Overall confidence as reported upstream
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub num_sources: Option<i64>,
    #[serde(default)]
    pub source_consensus: Option<SourceConsensus>,
    #[serde(default)]
    pub processing_time_seconds: Option<f64>,
}

/// Fact-check record: at most one row per article, ever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheck {
    pub id: Uuid,
    pub article_id: Uuid,
    /// Identifier assigned by the verification service for this submission
    pub job_id: String,
    pub status: FactCheckStatus,

    /// NULL while PENDING, set exactly once on the terminal transition
    pub verdict: Option<Verdict>,
    /// Derived 0-100 score, never user-supplied
    pub credibility_score: Option<i64>,
    pub confidence: Option<f64>,
    pub summary: Option<String>,

    pub claims_analyzed: i64,
    pub claims_true: i64,
    pub claims_false: i64,
    pub claims_misleading: i64,
    pub claims_unverified: i64,

    /// Raw payload with per-claim evidence, retained verbatim
    pub validation_results: Option<serde_json::Value>,
    pub num_sources: Option<i64>,
    pub source_consensus: Option<SourceConsensus>,
    pub processing_time_seconds: Option<f64>,

    /// Timestamp of the terminal transition
    pub fact_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FactCheck {
    /// Create the PENDING row inserted right after remote job acceptance
    pub fn pending(article_id: Uuid, job_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            article_id,
            job_id,
            status: FactCheckStatus::Pending,
            verdict: None,
            credibility_score: None,
            confidence: None,
            summary: None,
            claims_analyzed: 0,
            claims_true: 0,
            claims_false: 0,
            claims_misleading: 0,
            claims_unverified: 0,
            validation_results: None,
            num_sources: None,
            source_consensus: None,
            processing_time_seconds: None,
            fact_checked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Handle returned by `submit()` while the attempt runs in the background
#[derive(Debug, Clone, Serialize)]
pub struct FactCheckTicket {
    pub fact_check_id: Uuid,
    pub article_id: Uuid,
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// Caller-facing status view; pre-completion reads are never errors
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactCheckStatusView {
    /// No fact-check has been submitted for this article
    NotSubmitted,
    /// Poll loop still running against the remote job
    Pending { job_id: String },
    /// Terminal outcome reached (COMPLETE, ERROR, or TIMEOUT)
    Terminal {
        verdict: Verdict,
        credibility_score: i64,
        fact_checked_at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_text_round_trip() {
        for v in [
            Verdict::True,
            Verdict::MostlyTrue,
            Verdict::Mixed,
            Verdict::MostlyFalse,
            Verdict::False,
            Verdict::Misleading,
            Verdict::Unverified,
            Verdict::Misinformation,
            Verdict::Error,
            Verdict::Timeout,
        ] {
            assert_eq!(Verdict::parse(v.as_str()), Some(v));
        }
        assert_eq!(Verdict::parse("BOGUS"), None);
    }

    #[test]
    fn test_claim_verdict_serde_labels() {
        let claim: ClaimResult =
            serde_json::from_str(r#"{"verdict": "MOSTLY_TRUE", "confidence": 0.7}"#).unwrap();
        assert_eq!(claim.verdict, ClaimVerdict::MostlyTrue);
        assert_eq!(claim.confidence, Some(0.7));
        assert!(claim.claim.is_none());
    }

    #[test]
    fn test_unknown_claim_label_fails_deserialization() {
        let result: std::result::Result<VerdictPayload, _> =
            serde_json::from_str(r#"{"claims": [{"verdict": "SORT_OF_TRUE"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_pending_row_has_no_terminal_fields() {
        let fc = FactCheck::pending(Uuid::new_v4(), "job-1".to_string());
        assert_eq!(fc.status, FactCheckStatus::Pending);
        assert!(!fc.is_terminal());
        assert!(fc.verdict.is_none());
        assert!(fc.credibility_score.is_none());
        assert!(fc.fact_checked_at.is_none());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!FactCheckStatus::Pending.is_terminal());
        assert!(FactCheckStatus::Complete.is_terminal());
        assert!(FactCheckStatus::Error.is_terminal());
        assert!(FactCheckStatus::Timeout.is_terminal());
    }
}
