//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `GATEKEEPER_` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use gatekeeper::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod catalog;
mod engine;
mod error;
mod gemini;
mod okta;
mod slack;

pub use catalog::CatalogConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use gemini::GeminiConfig;
pub use okta::OktaConfig;
pub use slack::SlackConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Engine tuning (confidence threshold, idle timeout, admin channel)
    pub engine: EngineConfig,

    /// Slack Web API configuration
    pub slack: SlackConfig,

    /// Gemini classifier configuration
    pub gemini: GeminiConfig,

    /// Okta management API configuration
    pub okta: OktaConfig,

    /// Catalog snapshot configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads environment variables with the
    /// `GATEKEEPER` prefix, using `__` to separate nested values:
    ///
    /// - `GATEKEEPER__ENGINE__ADMIN_CHANNEL=C123` -> `engine.admin_channel`
    /// - `GATEKEEPER__SLACK__BOT_TOKEN=xoxb-...` -> `slack.bot_token`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into their expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GATEKEEPER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.slack.validate()?;
        self.gemini.validate()?;
        self.okta.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}
