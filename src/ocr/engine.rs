//! OCR Engines
//!
//! Defines the engine trait and the Tesseract implementation.
//!
//! Engines are stateful and not reentrant: `recognize` takes `&mut self`, so
//! sharing one engine between callers requires exclusive ownership, which is
//! what [`crate::pool::EnginePool`] hands out.

use super::types::{OcrError, OcrResult};

/// A synchronous, CPU-bound recognition engine
pub trait OcrEngine: Send + 'static {
    /// Engine identifier (e.g. "tesseract")
    fn name(&self) -> &'static str;

    /// Decode `image` and recognize its text
    fn recognize(&mut self, image: &[u8]) -> Result<OcrResult, OcrError>;
}

/// Tesseract OCR engine backed by leptess
#[cfg(feature = "ocr-tesseract")]
pub struct TesseractEngine {
    api: leptess::LepTess,
}

// SAFETY: the underlying TessBaseAPI has no thread affinity; it only must not be
// used from two threads at once, which `&mut self` on every call rules out.
#[cfg(feature = "ocr-tesseract")]
unsafe impl Send for TesseractEngine {}

#[cfg(feature = "ocr-tesseract")]
impl TesseractEngine {
    /// Load the language data and initialize a new engine instance
    pub fn new(config: &super::EngineConfig) -> Result<Self, OcrError> {
        let data_path = config.data_path.to_str().ok_or_else(|| {
            OcrError::Initialization(format!(
                "Tessdata path is not valid UTF-8: {}",
                config.data_path.display()
            ))
        })?;

        if !config.data_path.is_dir() {
            return Err(OcrError::Initialization(format!(
                "Tessdata directory not found: {}",
                data_path
            )));
        }

        let api = leptess::LepTess::new(Some(data_path), &config.language).map_err(|e| {
            OcrError::Initialization(format!(
                "Failed to load language '{}' from {}: {:?}",
                config.language, data_path, e
            ))
        })?;

        Ok(Self { api })
    }
}

#[cfg(feature = "ocr-tesseract")]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&mut self, image: &[u8]) -> Result<OcrResult, OcrError> {
        self.api
            .set_image_from_mem(image)
            .map_err(|e| OcrError::ImageDecode(format!("{:?}", e)))?;

        let text = self
            .api
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("Invalid UTF-8 in recognized text: {}", e)))?;

        let confidence = self.api.mean_text_conf().clamp(0, 100) as f32;

        Ok(OcrResult { text, confidence })
    }
}
