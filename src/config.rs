//! Engine configuration
//!
//! TOML file → environment overrides → serde defaults, a trimmed-down
//! version of the multi-tier resolution the rest of the backend uses.
//! Environment variables use the `FACTCHECK_` prefix.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::services::orchestrator::OrchestratorConfig;

fn default_api_base_url() -> String {
    "http://127.0.0.1:8600/api/v1".to_string()
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_poll_timeout_secs() -> u64 {
    120
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_checks() -> usize {
    4
}

/// Fact-check engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Verification service API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token for the verification service, if it requires one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Seconds between remote status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Wall-clock deadline on the poll loop, seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Per-request HTTP timeout, seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Concurrent attempt bound
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: None,
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_checks: default_max_concurrent_checks(),
        }
    }
}

impl EngineConfig {
    /// Load configuration: TOML file when present, then `FACTCHECK_*`
    /// environment overrides, validated
    pub fn load(toml_path: &Path) -> Result<Self> {
        let mut config = if toml_path.exists() {
            let content = std::fs::read_to_string(toml_path)
                .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
            let parsed: EngineConfig = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Parse config failed: {}", e)))?;
            tracing::info!(path = %toml_path.display(), "Engine config loaded from TOML");
            parsed
        } else {
            tracing::info!("No config file found, using defaults");
            EngineConfig::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from an arbitrary lookup
    /// (injected for testability; `load` passes `std::env::var`)
    pub fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = get("FACTCHECK_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(key) = get("FACTCHECK_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(value) = get("FACTCHECK_POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_override("FACTCHECK_POLL_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = get("FACTCHECK_POLL_TIMEOUT_SECS") {
            self.poll_timeout_secs = parse_override("FACTCHECK_POLL_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("FACTCHECK_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_override("FACTCHECK_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("FACTCHECK_MAX_CONCURRENT_CHECKS") {
            self.max_concurrent_checks =
                parse_override("FACTCHECK_MAX_CONCURRENT_CHECKS", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be > 0".to_string()));
        }
        if self.poll_timeout_secs == 0 {
            return Err(Error::Config("poll_timeout_secs must be > 0".to_string()));
        }
        if self.max_concurrent_checks == 0 {
            return Err(Error::Config(
                "max_concurrent_checks must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
            max_concurrent_checks: self.max_concurrent_checks,
        }
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
