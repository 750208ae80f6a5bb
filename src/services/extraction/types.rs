//! Extraction service types and events.

use crate::models::{ExtractionMethod, PageRecord};
use crate::pdf::PageText;

use super::ExtractionError;

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// Document opened, pages about to be processed
    RunStarted { run_id: String, total_pages: u32 },
    /// Page resolved without error
    PageResolved {
        page_number: u32,
        method: ExtractionMethod,
        char_count: usize,
    },
    /// Page needed OCR and rendering or recognition failed
    PageFailed { page_number: u32, error: String },
    /// Every page resolved, record built
    RunCompleted {
        run_id: String,
        ocr_pages: usize,
        failed_pages: usize,
    },
}

impl ExtractionEvent {
    /// Event describing a resolved page.
    pub fn for_page(record: &PageRecord) -> Self {
        match &record.error {
            Some(error) => ExtractionEvent::PageFailed {
                page_number: record.page_number,
                error: error.clone(),
            },
            None => ExtractionEvent::PageResolved {
                page_number: record.page_number,
                method: record.extraction_method,
                char_count: record.char_count,
            },
        }
    }
}

/// Decision state of one page.
///
/// Every page starts `Pending` with its embedded text and moves exactly
/// once to one of the two resolved states.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// Embedded text read, no decision yet.
    Pending(PageText),
    /// Embedded text was sufficient.
    ResolvedText(PageRecord),
    /// Page went through rendering and OCR (possibly failed).
    ResolvedOcr(PageRecord),
}

impl PageState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, PageState::Pending(_))
    }

    /// The page record of a resolved state.
    pub fn finish(self, page_number: u32) -> Result<PageRecord, ExtractionError> {
        match self {
            PageState::ResolvedText(record) | PageState::ResolvedOcr(record) => Ok(record),
            PageState::Pending(_) => Err(ExtractionError::Unresolved { page: page_number }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_cannot_finish() {
        let state = PageState::Pending(PageText::new("abc".to_string()));
        assert!(!state.is_resolved());
        assert!(matches!(
            state.finish(3),
            Err(ExtractionError::Unresolved { page: 3 })
        ));
    }

    #[test]
    fn test_event_for_failed_page() {
        let record = PageRecord::ocr_failed(2, 0, "s/page_2.jpg".to_string(), "boom".to_string());
        assert_eq!(
            ExtractionEvent::for_page(&record),
            ExtractionEvent::PageFailed {
                page_number: 2,
                error: "boom".to_string()
            }
        );
        let state = PageState::ResolvedOcr(record.clone());
        assert!(state.is_resolved());
        assert_eq!(state.finish(2).unwrap(), record);
    }
}
