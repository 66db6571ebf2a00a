//! Okta configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Okta management API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OktaConfig {
    /// Org base URL, e.g. `https://example.okta.com`.
    pub base_url: String,

    /// Management API token
    pub api_token: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl OktaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("OKTA__BASE_URL"));
        }
        if !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl("okta"));
        }
        if self.api_token.is_empty() {
            return Err(ValidationError::MissingRequired("OKTA__API_TOKEN"));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}
