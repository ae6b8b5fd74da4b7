//! OCR Types
//!
//! Defines the recognition result, engine configuration and engine errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// OCR result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResult {
    /// Recognized text (may be empty when nothing was found)
    pub text: String,
    /// Mean confidence score (0-100)
    pub confidence: f32,
}

impl OcrResult {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Configuration every engine instance in a pool is bound to
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the `<lang>.traineddata` files
    pub data_path: PathBuf,
    /// Recognition language (e.g. "eng")
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("ocrtessdata"),
            language: "eng".to_string(),
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),
}

impl OcrError {
    /// Whether the failure was caused by the submitted bytes rather than the engine
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::ImageDecode(_))
    }
}
