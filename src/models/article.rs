//! Article record
//!
//! The engine owns only the denormalized credibility fields on this
//! record (`credibility_score`, `fact_check_verdict`, `fact_checked_at`);
//! everything else belongs to the ingestion/CRUD surface and is carried
//! here read-only. The denormalized trio stays NULL until the first
//! terminal fact-check outcome is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Article record (the fact-check engine's view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub content: Option<String>,

    /// Denormalized copy of the fact-check credibility score (0-100)
    pub credibility_score: Option<i64>,
    /// Denormalized copy of the aggregate verdict label
    pub fact_check_verdict: Option<String>,
    /// Denormalized copy of the terminal timestamp
    pub fact_checked_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Create a new article with no fact-check data yet
    pub fn new(title: String, url: String, content: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            url,
            content,
            credibility_score: None,
            fact_check_verdict: None,
            fact_checked_at: None,
            created_at: Utc::now(),
        }
    }
}
