//! IntentClassifier port - Interface for the external NLP intent service.
//!
//! The classifier is consumed as a black box: text plus any previously
//! collected slots go in, a structured intent with slot values and a
//! confidence score comes out. Failures and timeouts are transient; the
//! caller leaves conversation state untouched and asks the user to retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::EngineError;

/// Recognized user intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The user wants access to a group.
    RequestAccess,
    /// The user is asking what they can request.
    CatalogHelp,
    /// Anything the classifier could not map to a supported intent.
    #[serde(other)]
    Unknown,
}

/// Structured classifier output for one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Detected intent.
    pub intent: Intent,
    /// Slot values extracted from this turn, keyed by slot name.
    #[serde(default)]
    pub slots: HashMap<String, String>,
    /// Classifier confidence in [0.0, 1.0].
    pub confidence: f32,
}

impl Classification {
    /// Creates a classification with no slots.
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self {
            intent,
            slots: HashMap::new(),
            confidence,
        }
    }

    /// Adds a slot value.
    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }
}

/// Port for the external intent classification service.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifies one chat turn, given slots collected on earlier turns.
    async fn classify(
        &self,
        text: &str,
        context_slots: &HashMap<String, String>,
    ) -> Result<Classification, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_builder_collects_slots() {
        let c = Classification::new(Intent::RequestAccess, 0.93)
            .with_slot("target_group", "billing-readers");
        assert_eq!(c.intent, Intent::RequestAccess);
        assert_eq!(c.slots.get("target_group").map(String::as_str), Some("billing-readers"));
    }

    #[test]
    fn classification_deserializes_without_slots() {
        let json = r#"{"intent":"catalog_help","confidence":0.8}"#;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert_eq!(c.intent, Intent::CatalogHelp);
        assert!(c.slots.is_empty());
    }
}
