//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Confidence threshold must be between 0 and 1")]
    InvalidConfidenceThreshold,

    #[error("Conversation timeout must be positive")]
    InvalidConversationTimeout,

    #[error("Invalid base URL format: {0}")]
    InvalidBaseUrl(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,
}
