//! Slack Web API client shared by the chat and directory adapters.
//!
//! # Configuration
//!
//! ```ignore
//! let config = SlackConfig::new(bot_token);
//! let client = SlackClient::new(config);
//! ```

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::foundation::{ChannelId, EmailAddress, EngineError, UserId};

/// Configuration for the Slack Web API client.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token for authentication.
    bot_token: Secret<String>,
    /// Base URL for the API (default: https://slack.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SlackConfig {
    /// Creates a new configuration with the given bot token.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: Secret::new(bot_token.into()),
            base_url: "https://slack.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL (useful for pointing at a test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn bot_token(&self) -> &str {
        self.bot_token.expose_secret()
    }
}

/// Slack Web API client.
pub struct SlackClient {
    config: SlackConfig,
    client: Client,
}

impl SlackClient {
    /// Creates a new Slack client with the given configuration.
    pub fn new(config: SlackConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::store(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/api/{}", self.config.base_url, method)
    }

    /// Calls a Web API method and returns the parsed `ok`-checked body.
    pub async fn call(&self, method: &str, payload: Value) -> Result<Value, EngineError> {
        let response = self
            .client
            .post(self.method_url(method))
            .bearer_auth(self.config.bot_token())
            .json(&payload)
            .send()
            .await
            .map_err(|e| EngineError::transient("slack", e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::transient("slack", e.to_string()))?;

        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            return Err(classify_api_error(method, error));
        }
        Ok(body)
    }

    /// Posts a message; returns the message timestamp.
    pub async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
        blocks: Option<Value>,
    ) -> Result<String, EngineError> {
        let mut payload = json!({
            "channel": channel.as_str(),
            "text": text,
        });
        if let Some(blocks) = blocks {
            payload["blocks"] = blocks;
        }
        let body = self.call("chat.postMessage", payload).await?;
        Ok(body
            .get("ts")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Looks up a user's profile email by their member id.
    pub async fn user_email(&self, user_id: &UserId) -> Result<EmailAddress, EngineError> {
        let body = self
            .call("users.info", json!({ "user": user_id.as_str() }))
            .await?;
        let email = body
            .pointer("/user/profile/email")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EngineError::validation(format!("user {} has no profile email", user_id))
            })?;
        EmailAddress::new(email)
    }

    /// Looks up a member id by email address.
    pub async fn user_id_by_email(&self, email: &EmailAddress) -> Result<UserId, EngineError> {
        let body = self
            .call("users.lookupByEmail", json!({ "email": email.as_str() }))
            .await?;
        let id = body
            .pointer("/user/id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EngineError::validation(format!("no platform user for email {}", email))
            })?;
        UserId::new(id)
    }
}

/// Maps a Slack API error string onto the engine taxonomy.
fn classify_api_error(method: &str, error: &str) -> EngineError {
    match error {
        "ratelimited" | "internal_error" | "service_unavailable" | "fatal_error" => {
            EngineError::transient("slack", format!("{}: {}", method, error))
        }
        _ => EngineError::validation(format!("slack {}: {}", method, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_classify_as_transient() {
        assert!(classify_api_error("chat.postMessage", "ratelimited").is_transient());
        assert!(classify_api_error("users.info", "internal_error").is_transient());
    }

    #[test]
    fn caller_errors_classify_as_validation() {
        let err = classify_api_error("users.lookupByEmail", "users_not_found");
        assert!(!err.is_transient());
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn config_defaults_to_public_api() {
        let config = SlackConfig::new("xoxb-test");
        assert_eq!(config.base_url, "https://slack.com");
    }
}
