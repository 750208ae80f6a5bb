//! Layout-aware text extraction using poppler's pdftotext.

use std::process::Command;

use super::{PageText, PdfDocument, PdfError, TextBackend, TextBackendType};

const PDFTOTEXT_NOT_FOUND: &str = "pdftotext (install poppler-utils)";

/// Reads the text layer with `pdftotext -layout`, keeping column alignment.
#[derive(Debug, Clone)]
pub struct LayoutTextBackend {
    program: String,
}

impl Default for LayoutTextBackend {
    fn default() -> Self {
        Self {
            program: "pdftotext".to_string(),
        }
    }
}

impl LayoutTextBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different pdftotext executable.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }
}

impl TextBackend for LayoutTextBackend {
    fn backend_type(&self) -> TextBackendType {
        TextBackendType::Layout
    }

    fn extract_page_text(&self, doc: &PdfDocument, page: u32) -> Result<PageText, PdfError> {
        let page_str = page.to_string();
        let output = Command::new(&self.program)
            .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(doc.path())
            .arg("-") // Output to stdout
            .output();

        match output {
            Ok(output) if output.status.success() => Ok(PageText::new(
                String::from_utf8_lossy(&output.stdout).into_owned(),
            )),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::debug!("pdftotext failed on page {}: {}", page, stderr.trim());
                Ok(PageText::empty())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PdfError::ToolNotFound(PDFTOTEXT_NOT_FOUND.to_string()))
            }
            Err(e) => Err(PdfError::Io(e)),
        }
    }
}
