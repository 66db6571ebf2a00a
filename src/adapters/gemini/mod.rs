//! Gemini adapter - LLM-backed intent classification.

mod classifier;

pub use classifier::{GeminiClassifier, GeminiConfig};
