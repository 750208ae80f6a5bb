//! Fast text-layer extraction straight from the page content streams.

use super::{PageText, PdfDocument, PdfError, TextBackend, TextBackendType};

/// Reads the embedded text layer in-process via lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeTextBackend;

impl NativeTextBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for NativeTextBackend {
    fn backend_type(&self) -> TextBackendType {
        TextBackendType::Native
    }

    fn extract_page_text(&self, doc: &PdfDocument, page: u32) -> Result<PageText, PdfError> {
        match doc.lopdf().extract_text(&[page]) {
            Ok(text) => Ok(PageText::new(text)),
            Err(e) => {
                // Image-only pages, missing content streams and unsupported
                // font encodings all surface here.
                tracing::debug!("No text layer on page {}: {}", page, e);
                Ok(PageText::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{build_pdf, TestPage};

    #[test]
    fn test_reads_text_layer_per_page() {
        let bytes = build_pdf(&[
            TestPage::Text("Quarterly revenue grew across all regions"),
            TestPage::Blank,
        ]);
        let doc = PdfDocument::from_bytes(&bytes, "mem.pdf").unwrap();
        assert_eq!(doc.page_count(), 2);

        let backend = NativeTextBackend::new();
        let first = backend.extract_page_text(&doc, 1).unwrap();
        assert!(first.text.contains("Quarterly revenue"));
        assert!(first.char_count >= "Quarterly revenue grew across all regions".len());

        let second = backend.extract_page_text(&doc, 2).unwrap();
        assert_eq!(second.char_count, 0);
    }

    #[test]
    fn test_missing_page_is_empty_not_error() {
        let bytes = build_pdf(&[TestPage::Text("only page")]);
        let doc = PdfDocument::from_bytes(&bytes, "mem.pdf").unwrap();
        let text = NativeTextBackend::new().extract_page_text(&doc, 5).unwrap();
        assert_eq!(text, PageText::empty());
    }
}
