//! OCR engine adapter.
//!
//! Recognizes text on rendered page images using:
//! - Tesseract via command-line (default)
//! - PaddleOCR for CNN-based OCR via ONNX (feature: ocr-paddle)
//!
//! Every engine reports its native detection result as a `RawValue`.
//! `OcrAdapter` normalizes that to plain values with `to_builtin` and reads
//! the fragments out, so engines never need to agree on numeric types.

mod adapter;
mod backend;
mod engine;
mod fragments;
pub mod normalize;
mod tesseract;

#[cfg(feature = "ocr-paddle")]
mod model_utils;
#[cfg(feature = "ocr-paddle")]
mod paddle_backend;

pub use adapter::{OcrAdapter, OcrOutput};
pub use backend::{OcrBackendType, OcrConfig, OcrEngine, OcrError};
pub use engine::{build_engine, shared_engine};
pub use fragments::{parse_detections, FragmentWarning};
pub use normalize::{to_builtin, RawValue};
pub use tesseract::{parse_tsv, TesseractEngine};

#[cfg(feature = "ocr-paddle")]
pub use paddle_backend::PaddleEngine;
