//! Process-wide OCR engine.
//!
//! Engines are expensive to start (model loading for PaddleOCR), so one
//! instance is built on first use and shared by every run in the process.

use std::sync::OnceLock;

use super::backend::{OcrBackendType, OcrConfig, OcrEngine, OcrError};
use super::tesseract::TesseractEngine;

static SHARED_ENGINE: OnceLock<Box<dyn OcrEngine>> = OnceLock::new();

/// Build a fresh engine for `config`.
pub fn build_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    match config.backend {
        OcrBackendType::Tesseract => Ok(Box::new(TesseractEngine::with_config(config.clone()))),
        #[cfg(feature = "ocr-paddle")]
        OcrBackendType::PaddleOcr => Ok(Box::new(super::paddle_backend::PaddleEngine::with_config(
            config.clone(),
        ))),
        #[cfg(not(feature = "ocr-paddle"))]
        OcrBackendType::PaddleOcr => Err(OcrError::BackendNotAvailable(
            "PaddleOCR support not compiled in (rebuild with --features ocr-paddle)".to_string(),
        )),
    }
}

/// Get the shared engine, initializing it from `config` on first use.
///
/// Later calls return the same instance. A call asking for a different
/// backend than the one already running gets the running one.
pub fn shared_engine(config: &OcrConfig) -> Result<&'static dyn OcrEngine, OcrError> {
    if let Some(engine) = SHARED_ENGINE.get() {
        if engine.backend_type() != config.backend {
            tracing::warn!(
                "OCR engine already initialized as {}; ignoring request for {}",
                engine.backend_type(),
                config.backend
            );
        }
        return Ok(engine.as_ref());
    }

    let engine = build_engine(config)?;
    tracing::info!("Initialized {} OCR engine", engine.backend_type());

    // If another thread won the race, its engine is kept and ours dropped.
    let _ = SHARED_ENGINE.set(engine);

    SHARED_ENGINE
        .get()
        .map(|engine| engine.as_ref())
        .ok_or_else(|| OcrError::OcrFailed("Failed to cache OCR engine".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_engine_is_initialized_once() {
        let config = OcrConfig::default();
        let first = shared_engine(&config).unwrap();
        let second = shared_engine(&OcrConfig {
            language: "deu".to_string(),
            ..OcrConfig::default()
        })
        .unwrap();
        assert!(std::ptr::eq(
            first as *const dyn OcrEngine as *const u8,
            second as *const dyn OcrEngine as *const u8
        ));
        assert_eq!(first.backend_type(), OcrBackendType::Tesseract);
    }

    #[cfg(not(feature = "ocr-paddle"))]
    #[test]
    fn test_paddle_requires_feature() {
        let config = OcrConfig {
            backend: OcrBackendType::PaddleOcr,
            ..OcrConfig::default()
        };
        assert!(matches!(
            build_engine(&config),
            Err(OcrError::BackendNotAvailable(_))
        ));
    }
}
