//! Service layer for pdfsift.
//!
//! Domain logic separated from UI concerns; the CLI drives these and
//! renders their events.

pub mod batch;
pub mod extraction;

pub use batch::{ocr_all_pages, PageOcrOutcome};
pub use extraction::{
    ExtractionError, ExtractionEvent, ExtractionOptions, ExtractionRun, HybridExtractor,
    PageState, RunId,
};
