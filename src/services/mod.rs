//! Engine services

pub mod orchestrator;
pub mod verdict_transform;
pub mod verification_client;

pub use orchestrator::{FactCheckOrchestrator, OrchestratorConfig};
pub use verdict_transform::{summarize_claims, VerdictSummary, NEUTRAL_SCORE};
pub use verification_client::{
    HttpVerificationClient, JobStatus, VerificationClient, VerificationError,
    VerificationRequest,
};
