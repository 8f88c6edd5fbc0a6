//! Client configuration with YAML support

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Client configuration
///
/// Can be loaded from YAML or JSON, or constructed programmatically. The
/// bearer token is not part of it; hand that to the client
/// builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host, port and base path of the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version segment used in every path
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Timeout for a single request/response exchange, in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// User-Agent header (default: `toon-client/<version>`)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Backoff policies
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Connection failures and timeouts
    #[serde(default = "RetryPolicy::connection")]
    pub connection: RetryPolicy,

    /// HTTP 429 responses
    #[serde(default = "RetryPolicy::rate_limit")]
    pub rate_limit: RetryPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            connection: RetryPolicy::connection(),
            rate_limit: RetryPolicy::rate_limit(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.toon.eu/".to_string()
}

fn default_api_version() -> String {
    "v3".to_string()
}

fn default_request_timeout() -> u64 {
    8_000 // 8 seconds
}

/// User-Agent sent when none is configured
pub fn default_user_agent() -> String {
    format!("toon-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            request_timeout_ms: default_request_timeout(),
            user_agent: None,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(default_user_agent)
    }

    /// Path of the agreements list, relative to `base_url`
    pub fn agreements_path(&self) -> String {
        format!("toon/{}/agreements", self.api_version)
    }

    pub fn status_path(&self, agreement_id: &str) -> String {
        format!(
            "toon/{}/{}/status",
            self.api_version,
            encode_path_segment(agreement_id)
        )
    }

    pub fn thermostat_path(&self, agreement_id: &str) -> String {
        format!(
            "toon/{}/{}/thermostat",
            self.api_version,
            encode_path_segment(agreement_id)
        )
    }

    pub fn webhooks_path(&self, agreement_id: &str) -> String {
        format!(
            "toon/{}/{}/webhooks",
            self.api_version,
            encode_path_segment(agreement_id)
        )
    }

    pub fn webhook_path(&self, agreement_id: &str, application_id: &str) -> String {
        format!(
            "{}/{}",
            self.webhooks_path(agreement_id),
            encode_path_segment(application_id)
        )
    }
}

/// Keep an identifier inside a single path segment
fn encode_path_segment(id: &str) -> String {
    id.replace('%', "%25")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('#', "%23")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
