//! Gemini classifier configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("GEMINI__API_KEY"));
        }
        if self.model.is_empty() {
            return Err(ValidationError::MissingRequired("GEMINI__MODEL"));
        }
        if !self.base_url.starts_with("http") {
            return Err(ValidationError::InvalidBaseUrl("gemini"));
        }
        Ok(())
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    15
}
