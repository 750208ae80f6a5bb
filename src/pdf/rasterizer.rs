//! Page rendering for OCR.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::PdfDocument;

const PDFTOPPM_NOT_FOUND: &str = "pdftoppm (install poppler-utils)";

/// Rendering a single page failed. Recoverable: only that page degrades.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("rendering page {page} failed: {reason}")]
    RenderFailed { page: u32, reason: String },

    #[error("no image generated for page {page} at {path}")]
    MissingOutput { page: u32, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders one page of a document to a JPEG file.
pub trait PageRasterizer: Send + Sync {
    /// Render `page` (1-indexed) at `dpi` to exactly `output`.
    fn rasterize(
        &self,
        doc: &PdfDocument,
        page: u32,
        dpi: u32,
        output: &Path,
    ) -> Result<(), RasterError>;
}

/// Rasterizer backed by poppler's pdftoppm.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: String,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self {
            program: "pdftoppm".to_string(),
        }
    }
}

impl PdftoppmRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different pdftoppm executable.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(
        &self,
        doc: &PdfDocument,
        page: u32,
        dpi: u32,
        output: &Path,
    ) -> Result<(), RasterError> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // With -singlefile pdftoppm appends ".jpg" to the prefix itself.
        let prefix = output.with_extension("");
        let produced = prefix.with_extension("jpg");
        let page_str = page.to_string();
        let dpi_str = dpi.to_string();

        let result = Command::new(&self.program)
            .args(["-jpeg", "-singlefile", "-r", &dpi_str])
            .args(["-f", &page_str, "-l", &page_str])
            .arg(doc.path())
            .arg(&prefix)
            .output();

        match result {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                return Err(RasterError::RenderFailed {
                    page,
                    reason: String::from_utf8_lossy(&out.stderr).trim().to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RasterError::ToolNotFound(PDFTOPPM_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(RasterError::Io(e)),
        }

        if !produced.exists() {
            return Err(RasterError::MissingOutput {
                page,
                path: produced,
            });
        }
        if produced != output {
            std::fs::rename(&produced, output)?;
        }
        Ok(())
    }
}
