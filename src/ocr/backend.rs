//! OCR engine abstraction.
//!
//! Supports two engines behind one trait:
//! - Tesseract: command-line OCR, CPU (default)
//! - PaddleOCR: CNN-based OCR via ONNX Runtime (feature: ocr-paddle)
//!
//! Engines return their native detection output as a `RawValue`; turning
//! that into fragments is the adapter's job, not the engine's.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::normalize::RawValue;

/// Errors from OCR engines.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available OCR engine types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
    /// PaddleOCR via ONNX Runtime.
    #[serde(alias = "paddle")]
    #[value(name = "paddleocr", alias = "paddle")]
    PaddleOcr,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::PaddleOcr => "paddleocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "paddleocr" | "paddle" => Some(OcrBackendType::PaddleOcr),
            _ => None,
        }
    }
}

impl fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Which engine to run.
    pub backend: OcrBackendType,
    /// Language hint (tesseract language code, e.g. "eng").
    pub language: String,
    /// Directory holding model files, for engines that need them.
    pub model_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendType::Tesseract,
            language: "eng".to_string(),
            model_path: None,
        }
    }
}

/// An OCR engine that detects text regions in an image.
pub trait OcrEngine: Send + Sync {
    /// Get the engine type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this engine is available (binaries installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this engine available.
    fn availability_hint(&self) -> String;

    /// Run detection and recognition on an image file.
    ///
    /// Returns the engine's detection result in its native shape: a list
    /// of pages, each a list of `[box, [text, confidence]]` lines. An image
    /// with no text may yield `Null` or an empty list.
    fn detect(&self, image_path: &Path) -> Result<RawValue, OcrError>;
}
