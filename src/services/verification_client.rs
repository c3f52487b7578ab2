//! Verification service client
//!
//! **[FCE-INT-010]** Thin RPC wrapper around the remote claim-verification
//! API: submit a job, poll its status. The service's verdict-generation
//! logic is opaque; only the wire contract lives here. The trait seam lets
//! the orchestrator run against a scripted mock in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USER_AGENT: &str = "factcheck-engine/0.1.0";

/// Verification client errors
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Verification API returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Article content handed to the verification service
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRequest {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Remote job status as reported by the verification service
#[derive(Debug, Clone)]
pub enum JobStatus {
    /// Job still executing; poll again later
    Running,
    /// Job finished; raw verdict payload attached.
    /// Kept as raw JSON here: the orchestrator owns parsing so that a
    /// malformed payload becomes a terminal ERROR row, not a client error.
    Succeeded { result: serde_json::Value },
    /// The remote service itself reports failure
    Failed { reason: String },
}

/// Contract consumed by the orchestration service
#[async_trait]
pub trait VerificationClient: Send + Sync {
    /// Submit article content for verification, returning an opaque job id
    async fn submit_job(&self, request: &VerificationRequest)
        -> Result<String, VerificationError>;

    /// Query the status of a previously submitted job
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, VerificationError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of the verification contract
pub struct HttpVerificationClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpVerificationClient {
    /// Create a new client against the given API base URL
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, VerificationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| VerificationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl VerificationClient for HttpVerificationClient {
    async fn submit_job(
        &self,
        request: &VerificationRequest,
    ) -> Result<String, VerificationError> {
        let url = format!("{}/jobs", self.base_url);

        tracing::debug!(url = %url, article_url = %request.url, "Submitting verification job");

        let response = self
            .authorize(self.http_client.post(&url).json(request))
            .send()
            .await
            .map_err(|e| VerificationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VerificationError::Api(status.as_u16(), error_text));
        }

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| VerificationError::Parse(e.to_string()))?;

        tracing::info!(job_id = %submit.job_id, article_url = %request.url, "Verification job accepted");

        Ok(submit.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, VerificationError> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);

        let response = self
            .authorize(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| VerificationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VerificationError::Api(status.as_u16(), error_text));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| VerificationError::Parse(e.to_string()))?;

        match body.status.as_str() {
            "running" | "pending" | "queued" => Ok(JobStatus::Running),
            "succeeded" => Ok(JobStatus::Succeeded {
                result: body.result.unwrap_or(serde_json::Value::Null),
            }),
            "failed" => Ok(JobStatus::Failed {
                reason: body.error.unwrap_or_else(|| "unspecified failure".to_string()),
            }),
            other => Err(VerificationError::Parse(format!(
                "Unknown job status: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpVerificationClient::new(
            "https://verify.example.com/api/v1/".to_string(),
            Some("key".to_string()),
            Duration::from_secs(30),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://verify.example.com/api/v1");
    }

    #[test]
    fn test_status_response_parsing() {
        let body: StatusResponse = serde_json::from_str(
            r#"{"status": "succeeded", "result": {"claims": [{"verdict": "TRUE", "confidence": 0.9}]}}"#,
        )
        .unwrap();
        assert_eq!(body.status, "succeeded");
        assert!(body.result.is_some());
        assert!(body.error.is_none());
    }

    #[test]
    fn test_request_omits_absent_content() {
        let request = VerificationRequest {
            url: "https://news.example.com/a".to_string(),
            title: "Headline".to_string(),
            content: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("content"));
    }
}
