//! Slack configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Slack Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`).
    pub bot_token: String,

    /// API base URL (overridable for test servers).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SlackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token.is_empty() {
            return Err(ValidationError::MissingRequired("SLACK__BOT_TOKEN"));
        }
        if !self.base_url.starts_with("http") {
            return Err(ValidationError::InvalidBaseUrl("slack"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://slack.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
