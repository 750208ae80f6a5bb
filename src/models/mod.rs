//! Data models for pdfsift.

mod record;

pub use record::{
    fragment_text, page_key, parse_page_key, DocumentRecord, ExtractionMethod, OcrFragment,
    PageRecord, RecordError,
};
