//! Engine error taxonomy.
//!
//! Every failure crossing a handler boundary is one of four kinds, and the
//! kind decides what happens to persisted state:
//!
//! | Error | State effect | Surfaced as |
//! |-------|--------------|-------------|
//! | Transient | none | "try again" message to the user |
//! | Validation | none | rejection message, event dropped |
//! | Conflict | none (loser no-ops) | silent |
//! | TerminalProvisioning | Request -> Failed | requester + admin notice |
//! | Store | none beyond last committed write | invocation error |

use thiserror::Error;

use super::RequestId;

/// Errors produced by the lifecycle engine and its collaborators.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Recoverable failure from an external collaborator (timeout, rate
    /// limit). State is left unchanged; redelivery retries the invocation.
    #[error("transient failure from {source_name}: {message}")]
    Transient { source_name: String, message: String },

    /// Malformed event, unresolvable slot, or unknown/unauthorized actor.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// A conditional write lost a race. Success-for-the-loser: callers
    /// re-read current state and treat their own action as a no-op.
    #[error("conditional write lost the race on {key}")]
    Conflict { key: String },

    /// The provisioning collaborator reported the request is invalid.
    #[error("provisioning rejected request {request_id}: {message}")]
    TerminalProvisioning {
        request_id: RequestId,
        message: String,
    },

    /// Durable store failure outside of a CAS condition.
    #[error("store error: {message}")]
    Store { message: String },
}

impl EngineError {
    /// Creates a transient external error.
    pub fn transient(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Transient {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }

    /// Creates a conflict error for a lost conditional write.
    pub fn conflict(key: impl Into<String>) -> Self {
        EngineError::Conflict { key: key.into() }
    }

    /// Creates a terminal provisioning error.
    pub fn terminal_provisioning(request_id: RequestId, message: impl Into<String>) -> Self {
        EngineError::TerminalProvisioning {
            request_id,
            message: message.into(),
        }
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        EngineError::Store {
            message: message.into(),
        }
    }

    /// Returns true for failures that are safe to surface as "try again".
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Transient { .. })
    }

    /// Returns true for lost conditional writes.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_error_displays_source_and_message() {
        let err = EngineError::transient("classifier", "deadline exceeded");
        assert_eq!(
            format!("{}", err),
            "transient failure from classifier: deadline exceeded"
        );
        assert!(err.is_transient());
    }

    #[test]
    fn conflict_error_displays_key() {
        let err = EngineError::conflict("request/abc");
        assert_eq!(format!("{}", err), "conditional write lost the race on request/abc");
        assert!(err.is_conflict());
    }

    #[test]
    fn validation_error_is_not_transient() {
        let err = EngineError::validation("unknown actor");
        assert!(!err.is_transient());
        assert!(!err.is_conflict());
    }

    #[test]
    fn terminal_provisioning_error_carries_request_id() {
        let id = RequestId::new();
        let err = EngineError::terminal_provisioning(id, "group does not exist");
        let text = format!("{}", err);
        assert!(text.contains(&id.to_string()));
        assert!(text.contains("group does not exist"));
    }
}
