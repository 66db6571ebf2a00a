//! Engine tuning configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Lifecycle engine tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Classifier confidence below this asks the user to rephrase.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Conversations idle longer than this are abandoned by the sweep.
    #[serde(default = "default_conversation_timeout_secs")]
    pub conversation_timeout_secs: u64,

    /// Channel receiving operator notices for failed provisioning.
    pub admin_channel: String,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ValidationError::InvalidConfidenceThreshold);
        }
        if self.conversation_timeout_secs == 0 {
            return Err(ValidationError::InvalidConversationTimeout);
        }
        if self.admin_channel.is_empty() {
            return Err(ValidationError::MissingRequired("ENGINE__ADMIN_CHANNEL"));
        }
        Ok(())
    }
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_conversation_timeout_secs() -> u64 {
    1800
}
