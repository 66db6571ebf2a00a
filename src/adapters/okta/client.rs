//! Okta management API client.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::{EmailAddress, EngineError, GroupId};

/// Configuration for the Okta management API client.
#[derive(Debug, Clone)]
pub struct OktaConfig {
    /// Org base URL, e.g. `https://example.okta.com`.
    pub base_url: String,
    api_token: Secret<String>,
    pub timeout: Duration,
}

impl OktaConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: Secret::new(api_token.into()),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_token(&self) -> &str {
        self.api_token.expose_secret()
    }
}

/// Okta user record, trimmed to the fields the engine reads.
#[derive(Debug, Clone, Deserialize)]
pub struct OktaUser {
    pub id: String,
    pub profile: OktaProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OktaProfile {
    #[serde(default)]
    pub email: Option<String>,
    /// Manager's login (email) as maintained in the org profile.
    #[serde(rename = "managerId", default)]
    pub manager_id: Option<String>,
}

/// Okta management API client.
pub struct OktaClient {
    config: OktaConfig,
    client: Client,
}

impl OktaClient {
    pub fn new(config: OktaConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::store(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.config.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("SSWS {}", self.config.api_token())
    }

    /// Fetches a user by login (email works as a login in Okta).
    pub async fn get_user(&self, login: &EmailAddress) -> Result<Option<OktaUser>, EngineError> {
        let response = self
            .client
            .get(self.url(&format!("/users/{}", login.as_str())))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| EngineError::transient("okta", e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if retryable(status) => Err(EngineError::transient(
                "okta",
                format!("GET user returned {}", status),
            )),
            status if !status.is_success() => Err(EngineError::validation(format!(
                "okta GET user returned {}",
                status
            ))),
            _ => {
                let user = response
                    .json::<OktaUser>()
                    .await
                    .map_err(|e| EngineError::transient("okta", e.to_string()))?;
                Ok(Some(user))
            }
        }
    }

    /// Adds a user to a group. Returns the raw status for the caller to map
    /// onto its own error taxonomy.
    pub async fn add_user_to_group(
        &self,
        group_id: &GroupId,
        okta_user_id: &str,
    ) -> Result<StatusCode, EngineError> {
        let response = self
            .client
            .put(self.url(&format!("/groups/{}/users/{}", group_id.as_str(), okta_user_id)))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| EngineError::transient("okta", e.to_string()))?;
        Ok(response.status())
    }
}

/// Statuses worth retrying on redelivery.
pub(super) fn retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
