//! Opened PDF handle shared by the text backends and the rasterizer.

use std::path::{Path, PathBuf};

use super::PdfError;

const PDF_MIME: &str = "application/pdf";

/// A parsed PDF plus the on-disk path external tools read it from.
#[derive(Debug)]
pub struct PdfDocument {
    path: PathBuf,
    inner: lopdf::Document,
    page_count: u32,
}

impl PdfDocument {
    /// Open and parse a PDF file.
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path).map_err(|e| open_error(path, e.to_string()))?;
        Self::from_bytes(&bytes, path)
    }

    /// Parse PDF bytes that are (or will be) stored at `path`.
    ///
    /// Content is sniffed before parsing, so non-PDF uploads fail with
    /// `DocumentOpen` without touching the parser.
    pub fn from_bytes(bytes: &[u8], path: impl Into<PathBuf>) -> Result<Self, PdfError> {
        let path = path.into();

        match infer::get(bytes) {
            Some(kind) if kind.mime_type() == PDF_MIME => {}
            Some(kind) => {
                return Err(open_error(
                    &path,
                    format!("content detected as {}", kind.mime_type()),
                ))
            }
            None => return Err(open_error(&path, "unrecognized content".to_string())),
        }

        let inner = lopdf::Document::load_mem(bytes).map_err(|e| open_error(&path, e.to_string()))?;
        let page_count = inner.get_pages().len() as u32;

        tracing::debug!("Opened {} ({} pages)", path.display(), page_count);

        Ok(Self {
            path,
            inner,
            page_count,
        })
    }

    /// Location of the PDF on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub(crate) fn lopdf(&self) -> &lopdf::Document {
        &self.inner
    }
}

fn open_error(path: &Path, reason: String) -> PdfError {
    PdfError::DocumentOpen {
        path: path.display().to_string(),
        reason,
    }
}
