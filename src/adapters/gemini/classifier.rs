//! GeminiClassifier - `IntentClassifier` implementation over the Gemini API.
//!
//! Sends the user's message plus any already-collected slots and asks the
//! model for a single JSON object: `{"intent": ..., "slots": {...},
//! "confidence": ...}`. Anything the model returns that does not parse is
//! treated as an unconfident unknown rather than an error, so one garbled
//! completion never fails a turn.

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::EngineError;
use crate::ports::{Classification, Intent, IntentClassifier};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the Gemini classifier.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Intent classifier backed by Gemini `generateContent`.
pub struct GeminiClassifier {
    config: GeminiConfig,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiClassifier {
    pub fn new(config: GeminiConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::store(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl IntentClassifier for GeminiClassifier {
    async fn classify(
        &self,
        text: &str,
        collected_slots: &HashMap<String, String>,
    ) -> Result<Classification, EngineError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(text, collected_slots),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.0,
            },
        };

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key())])
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::transient("gemini", e.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(EngineError::transient(
                "gemini",
                format!("generateContent returned {}", status),
            ));
        }
        if !status.is_success() {
            return Err(EngineError::validation(format!(
                "gemini generateContent returned {}",
                status
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EngineError::transient("gemini", e.to_string()))?;

        let model_text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or_default();

        Ok(parse_classification(model_text))
    }
}

fn build_prompt(text: &str, collected_slots: &HashMap<String, String>) -> String {
    let mut prompt = String::from(
        "You route messages for an access request assistant. Classify the \
         message into one of these intents: \"request_access\" (the user wants \
         membership in a group or system), \"catalog_help\" (the user asks \
         what they can request), or \"unknown\".\n\
         Extract slots when present: \"target_group\" is the name of the group \
         or system the user wants.\n\
         Respond with a single JSON object only: {\"intent\": string, \
         \"slots\": object, \"confidence\": number between 0 and 1}.\n",
    );
    if !collected_slots.is_empty() {
        prompt.push_str("Already collected slots (do not ask for these again): ");
        let mut pairs: Vec<_> = collected_slots.iter().collect();
        pairs.sort();
        for (name, value) in pairs {
            prompt.push_str(&format!("{}={} ", name, value));
        }
        prompt.push('\n');
    }
    prompt.push_str(&format!("Message: {}", text));
    prompt
}

#[derive(Deserialize)]
struct RawClassification {
    intent: Intent,
    #[serde(default)]
    slots: HashMap<String, String>,
    #[serde(default)]
    confidence: f32,
}

/// Parses the model's text into a classification. Tolerates code fences and
/// falls back to an unconfident `Unknown` when the payload is not valid JSON.
fn parse_classification(model_text: &str) -> Classification {
    let stripped = strip_code_fence(model_text);
    match serde_json::from_str::<RawClassification>(stripped) {
        Ok(raw) => Classification {
            intent: raw.intent,
            slots: raw.slots,
            confidence: raw.confidence.clamp(0.0, 1.0),
        },
        Err(_) => Classification::new(Intent::Unknown, 0.0),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
