//! Domain records for the fact-check engine

pub mod article;
pub mod fact_check;

pub use article::Article;
pub use fact_check::{
    ClaimResult, ClaimVerdict, FactCheck, FactCheckStatus, FactCheckStatusView, FactCheckTicket,
    SourceConsensus, Verdict, VerdictPayload,
};
