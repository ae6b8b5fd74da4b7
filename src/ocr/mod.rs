//! OCR Module
//!
//! Recognition engines that turn raw image bytes into text plus a mean
//! confidence score.
//!
//! Supported backends:
//! - Tesseract (local, via leptess, feature `ocr-tesseract`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_service::ocr::{EngineConfig, OcrEngine, TesseractEngine};
//!
//! let mut engine = TesseractEngine::new(&EngineConfig::default())?;
//! let result = engine.recognize(&png_bytes)?;
//! println!("{} ({:.1})", result.text, result.confidence);
//! ```
//!
//! Engines are not meant to be called directly by request handlers; they are
//! owned by an [`crate::pool::EnginePool`].

mod engine;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::OcrEngine;
pub use types::{EngineConfig, OcrError, OcrResult};

#[cfg(feature = "ocr-tesseract")]
pub use engine::TesseractEngine;
