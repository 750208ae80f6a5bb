//! PDF access: opening documents, reading the embedded text layer, and
//! rendering pages for OCR.
//!
//! Two interchangeable text backends read the embedded layer:
//! - `NativeTextBackend`: fast, reads content streams in-process with lopdf
//! - `LayoutTextBackend`: layout-aware, uses poppler's `pdftotext -layout`
//!
//! Both produce a `PageText` whose char count is taken from the trimmed
//! text, while the text itself is returned as the backend produced it.

mod document;
mod layout;
mod native;
pub mod rasterizer;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use document::PdfDocument;
pub use layout::LayoutTextBackend;
pub use native::NativeTextBackend;
pub use rasterizer::{PageRasterizer, PdftoppmRasterizer, RasterError};

/// Errors from opening or reading a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The input cannot be parsed as a PDF. Fatal for a run.
    #[error("cannot open {path} as PDF: {reason}")]
    DocumentOpen { path: String, reason: String },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Embedded text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Text as returned by the backend, formatting preserved.
    pub text: String,
    /// Character count of the trimmed text.
    pub char_count: usize,
}

impl PageText {
    pub fn new(text: String) -> Self {
        let char_count = text.trim().chars().count();
        Self { text, char_count }
    }

    pub fn empty() -> Self {
        Self {
            text: String::new(),
            char_count: 0,
        }
    }
}

/// Available embedded-text backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextBackendType {
    /// In-process text layer reader (lopdf).
    #[default]
    Native,
    /// Layout-preserving reader (pdftotext -layout).
    Layout,
}

impl TextBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextBackendType::Native => "native",
            TextBackendType::Layout => "layout",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "native" | "fast" | "lopdf" => Some(TextBackendType::Native),
            "layout" | "pdftotext" => Some(TextBackendType::Layout),
            _ => None,
        }
    }

    /// Build the backend for this type.
    pub fn build(&self) -> Box<dyn TextBackend> {
        match self {
            TextBackendType::Native => Box::new(NativeTextBackend::new()),
            TextBackendType::Layout => Box::new(LayoutTextBackend::new()),
        }
    }
}

impl fmt::Display for TextBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reads the embedded text layer of a page.
pub trait TextBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> TextBackendType;

    /// Extract the text of one page (1-indexed).
    ///
    /// Pages without a text layer yield an empty `PageText`, never an error.
    /// Errors are reserved for conditions that affect every page, such as a
    /// missing external tool.
    fn extract_page_text(&self, doc: &PdfDocument, page: u32) -> Result<PageText, PdfError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_counts_trimmed_chars() {
        let page = PageText::new("  \n Hello wörld \n\n".to_string());
        assert_eq!(page.char_count, 11);
        assert_eq!(page.text, "  \n Hello wörld \n\n");
    }

    #[test]
    fn test_page_text_whitespace_only() {
        assert_eq!(PageText::new(" \n\t ".to_string()).char_count, 0);
        assert_eq!(PageText::empty().char_count, 0);
    }

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!(TextBackendType::from_str("Layout"), Some(TextBackendType::Layout));
        assert_eq!(TextBackendType::from_str("fast"), Some(TextBackendType::Native));
        assert_eq!(TextBackendType::from_str("mupdf"), None);
        assert_eq!(TextBackendType::default().to_string(), "native");
    }

    #[test]
    fn test_build_matches_type() {
        for ty in [TextBackendType::Native, TextBackendType::Layout] {
            assert_eq!(ty.build().backend_type(), ty);
        }
    }
}
