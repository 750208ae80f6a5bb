//! Per-document extraction records.
//!
//! A `DocumentRecord` is built in a single pass once every page has been
//! resolved. Its JSON form is the durable contract read back by the record
//! store, the document browser and the summary prompt builder, so the field
//! names here are fixed: pages are keyed `page_<n>` and OCR details live
//! under `ocr_data` / `image_path`.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when a record violates its structural invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} pages, found {actual}")]
    PageCountMismatch { expected: u32, actual: usize },

    #[error("page at position {position} is numbered {found}")]
    PageOutOfOrder { position: usize, found: u32 },

    #[error("page {page}: extraction method does not match char count and threshold")]
    MethodMismatch { page: u32 },

    #[error("page {page}: text-resolved page carries OCR artifacts")]
    OcrArtifactsOnTextPage { page: u32 },

    #[error("page {page}: OCR-resolved page has no image path")]
    MissingImagePath { page: u32 },

    #[error("ocr_pages_count is {declared} but {actual} pages used OCR")]
    OcrCountMismatch { declared: usize, actual: usize },
}

/// How the final text of a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer was long enough to be trusted.
    Text,
    /// Page was rendered and run through the OCR engine.
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Ocr => "ocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "ocr" => Some(Self::Ocr),
            _ => None,
        }
    }

    /// Pick the method for a page given its trimmed char count.
    ///
    /// The boundary is inclusive on the text side: a page with exactly
    /// `min_chars` characters keeps its embedded text.
    pub fn for_char_count(char_count: usize, min_chars: usize) -> Self {
        if char_count >= min_chars {
            Self::Text
        } else {
            Self::Ocr
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OCR-detected text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrFragment {
    /// Polygon around the detected region as `[x, y]` pairs.
    #[serde(rename = "box")]
    pub bounding_polygon: Vec<[f64; 2]>,
    /// Recognized text.
    pub text: String,
    /// Recognition confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Join fragment texts into the page text: single spaces, no trailing whitespace.
pub fn fragment_text(fragments: &[OcrFragment]) -> String {
    let mut text = String::new();
    for fragment in fragments {
        text.push_str(&fragment.text);
        text.push(' ');
    }
    text.truncate(text.trim_end().len());
    text
}

/// Extraction result for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed).
    pub page_number: u32,
    /// Length of the trimmed embedded text, computed before any OCR.
    pub char_count: usize,
    /// Which path resolved this page.
    pub extraction_method: ExtractionMethod,
    /// Final text for the page.
    pub text: String,
    /// OCR fragments, present only for OCR-resolved pages.
    #[serde(rename = "ocr_data", default, skip_serializing_if = "Option::is_none")]
    pub ocr_fragments: Option<Vec<OcrFragment>>,
    /// Rendered page image, present only for OCR-resolved pages.
    #[serde(rename = "image_path", default, skip_serializing_if = "Option::is_none")]
    pub rendered_image_path: Option<String>,
    /// Why OCR (or rendering) failed for this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Detection lines skipped while reading the OCR output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl PageRecord {
    /// A page whose embedded text was sufficient.
    pub fn from_embedded_text(page_number: u32, char_count: usize, text: String) -> Self {
        Self {
            page_number,
            char_count,
            extraction_method: ExtractionMethod::Text,
            text,
            ocr_fragments: None,
            rendered_image_path: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    /// A page resolved through OCR.
    pub fn from_ocr(
        page_number: u32,
        char_count: usize,
        image_path: String,
        fragments: Vec<OcrFragment>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            page_number,
            char_count,
            extraction_method: ExtractionMethod::Ocr,
            text: fragment_text(&fragments),
            ocr_fragments: Some(fragments),
            rendered_image_path: Some(image_path),
            error: None,
            warnings,
        }
    }

    /// A page that needed OCR but could not be rendered or recognized.
    pub fn ocr_failed(
        page_number: u32,
        char_count: usize,
        image_path: String,
        error: String,
    ) -> Self {
        Self {
            page_number,
            char_count,
            extraction_method: ExtractionMethod::Ocr,
            text: String::new(),
            ocr_fragments: None,
            rendered_image_path: Some(image_path),
            error: Some(error),
            warnings: Vec::new(),
        }
    }

    pub fn is_ocr(&self) -> bool {
        self.extraction_method == ExtractionMethod::Ocr
    }

    fn check(&self, min_chars: usize) -> Result<(), RecordError> {
        let page = self.page_number;
        if ExtractionMethod::for_char_count(self.char_count, min_chars) != self.extraction_method {
            return Err(RecordError::MethodMismatch { page });
        }
        match self.extraction_method {
            ExtractionMethod::Text => {
                if self.ocr_fragments.is_some() || self.rendered_image_path.is_some() {
                    return Err(RecordError::OcrArtifactsOnTextPage { page });
                }
            }
            ExtractionMethod::Ocr => {
                if self.rendered_image_path.is_none() {
                    return Err(RecordError::MissingImagePath { page });
                }
            }
        }
        Ok(())
    }
}

/// Map key for a page number.
pub fn page_key(page_number: u32) -> String {
    format!("page_{}", page_number)
}

/// Parse a `page_<n>` map key.
pub fn parse_page_key(key: &str) -> Option<u32> {
    key.strip_prefix("page_")
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Aggregate record for one extraction run over one PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocumentRecord")]
pub struct DocumentRecord {
    pdf_path: String,
    total_pages: u32,
    min_chars_threshold: usize,
    dpi: u32,
    ocr_pages_count: usize,
    #[serde(with = "page_map")]
    pages: Vec<PageRecord>,
}

impl DocumentRecord {
    /// Assemble a record from fully resolved pages.
    ///
    /// `pages` must hold pages `1..=total_pages` in order; the OCR page count
    /// is derived from them.
    pub fn new(
        pdf_path: impl Into<String>,
        total_pages: u32,
        min_chars_threshold: usize,
        dpi: u32,
        pages: Vec<PageRecord>,
    ) -> Result<Self, RecordError> {
        if pages.len() != total_pages as usize {
            return Err(RecordError::PageCountMismatch {
                expected: total_pages,
                actual: pages.len(),
            });
        }
        for (idx, page) in pages.iter().enumerate() {
            if page.page_number as usize != idx + 1 {
                return Err(RecordError::PageOutOfOrder {
                    position: idx + 1,
                    found: page.page_number,
                });
            }
            page.check(min_chars_threshold)?;
        }
        let ocr_pages_count = pages.iter().filter(|p| p.is_ocr()).count();

        Ok(Self {
            pdf_path: pdf_path.into(),
            total_pages,
            min_chars_threshold,
            dpi,
            ocr_pages_count,
            pages,
        })
    }

    pub fn pdf_path(&self) -> &str {
        &self.pdf_path
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn min_chars_threshold(&self) -> usize {
        self.min_chars_threshold
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Number of pages that went through OCR.
    pub fn ocr_pages_count(&self) -> usize {
        self.ocr_pages_count
    }

    /// Pages in ascending page-number order.
    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    /// Look up a page by its 1-based number.
    pub fn page(&self, page_number: u32) -> Option<&PageRecord> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
    }

    /// Pages whose OCR or rendering failed.
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|p| p.error.is_some())
    }

    /// Sum of embedded-text char counts over all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.char_count).sum()
    }

    /// Page texts in order, joined with newlines.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pretty-printed JSON in the durable record shape.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Unvalidated record as read from JSON.
#[derive(Deserialize)]
struct RawDocumentRecord {
    pdf_path: String,
    total_pages: u32,
    min_chars_threshold: usize,
    dpi: u32,
    ocr_pages_count: usize,
    #[serde(with = "page_map")]
    pages: Vec<PageRecord>,
}

impl TryFrom<RawDocumentRecord> for DocumentRecord {
    type Error = RecordError;

    fn try_from(raw: RawDocumentRecord) -> Result<Self, Self::Error> {
        let record = DocumentRecord::new(
            raw.pdf_path,
            raw.total_pages,
            raw.min_chars_threshold,
            raw.dpi,
            raw.pages,
        )?;
        if record.ocr_pages_count != raw.ocr_pages_count {
            return Err(RecordError::OcrCountMismatch {
                declared: raw.ocr_pages_count,
                actual: record.ocr_pages_count,
            });
        }
        Ok(record)
    }
}

/// `pages` is a JSON object keyed `page_<n>`, written in page order.
mod page_map {
    use super::*;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(pages: &Vec<PageRecord>, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(pages.len()))?;
        for page in pages {
            map.serialize_entry(&page_key(page.page_number), page)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PageRecord>, D::Error> {
        d.deserialize_map(PageMapVisitor)
    }

    struct PageMapVisitor;

    impl<'de> Visitor<'de> for PageMapVisitor {
        type Value = Vec<PageRecord>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of page_<n> keys to page records")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut pages: Vec<PageRecord> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, page)) = access.next_entry::<String, PageRecord>()? {
                let number = parse_page_key(&key)
                    .ok_or_else(|| de::Error::custom(format!("invalid page key `{}`", key)))?;
                if number != page.page_number {
                    return Err(de::Error::custom(format!(
                        "key `{}` holds page_number {}",
                        key, page.page_number
                    )));
                }
                pages.push(page);
            }
            pages.sort_by_key(|p| p.page_number);
            if let Some(dup) = pages.windows(2).find(|w| w[0].page_number == w[1].page_number) {
                return Err(de::Error::custom(format!(
                    "duplicate page {}",
                    dup[0].page_number
                )));
            }
            Ok(pages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(text: &str, confidence: f64) -> OcrFragment {
        OcrFragment {
            bounding_polygon: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]],
            text: text.to_string(),
            confidence,
        }
    }

    fn two_page_record() -> DocumentRecord {
        let pages = vec![
            PageRecord::from_ocr(
                1,
                5,
                "/tmp/run/page_1.jpg".to_string(),
                vec![fragment("Scanned", 0.9), fragment("heading", 0.8)],
                Vec::new(),
            ),
            PageRecord::from_embedded_text(2, 50, "x".repeat(50)),
        ];
        DocumentRecord::new("/tmp/in.pdf", 2, 20, 200, pages).unwrap()
    }

    #[test]
    fn test_method_boundary_is_inclusive() {
        assert_eq!(ExtractionMethod::for_char_count(20, 20), ExtractionMethod::Text);
        assert_eq!(ExtractionMethod::for_char_count(19, 20), ExtractionMethod::Ocr);
        assert_eq!(ExtractionMethod::for_char_count(0, 0), ExtractionMethod::Text);
    }

    #[test]
    fn test_fragment_text_joins_with_single_space() {
        let frags = vec![fragment("Hello", 0.9), fragment("world  ", 0.9)];
        assert_eq!(fragment_text(&frags), "Hello world");
        assert_eq!(fragment_text(&[]), "");
    }

    #[test]
    fn test_page_keys() {
        assert_eq!(page_key(3), "page_3");
        assert_eq!(parse_page_key("page_12"), Some(12));
        assert_eq!(parse_page_key("page_0"), None);
        assert_eq!(parse_page_key("12"), None);
        assert_eq!(parse_page_key("page_x"), None);
    }

    #[test]
    fn test_ocr_count_is_derived() {
        let record = two_page_record();
        assert_eq!(record.ocr_pages_count(), 1);
        assert_eq!(record.total_chars(), 55);
        assert_eq!(record.page(1).unwrap().text, "Scanned heading");
        assert!(record.page(0).is_none());
        assert!(record.page(3).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(two_page_record()).unwrap();
        assert_eq!(value["pdf_path"], "/tmp/in.pdf");
        assert_eq!(value["total_pages"], 2);
        assert_eq!(value["min_chars_threshold"], 20);
        assert_eq!(value["dpi"], 200);
        assert_eq!(value["ocr_pages_count"], 1);

        let page1 = &value["pages"]["page_1"];
        assert_eq!(page1["extraction_method"], "ocr");
        assert_eq!(page1["image_path"], "/tmp/run/page_1.jpg");
        assert_eq!(page1["ocr_data"][0]["text"], "Scanned");
        assert_eq!(page1["ocr_data"][0]["box"][1], json!([10.0, 0.0]));
        assert!(page1.get("error").is_none());
        assert!(page1.get("warnings").is_none());

        let page2 = value["pages"]["page_2"].as_object().unwrap();
        assert_eq!(page2["extraction_method"], "text");
        assert!(!page2.contains_key("ocr_data"));
        assert!(!page2.contains_key("image_path"));
    }

    #[test]
    fn test_pages_written_in_numeric_order() {
        let pages = (1..=11)
            .map(|n| PageRecord::from_embedded_text(n, 30, "t".repeat(30)))
            .collect();
        let record = DocumentRecord::new("a.pdf", 11, 20, 200, pages).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let p2 = json.find("\"page_2\"").unwrap();
        let p10 = json.find("\"page_10\"").unwrap();
        assert!(p2 < p10);
    }

    #[test]
    fn test_round_trip_preserves_record() {
        let record = two_page_record();
        let json = record.to_json_pretty().unwrap();
        let back: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_rejects_gap_in_pages() {
        let pages = vec![
            PageRecord::from_embedded_text(1, 30, "a".repeat(30)),
            PageRecord::from_embedded_text(3, 30, "b".repeat(30)),
        ];
        assert_eq!(
            DocumentRecord::new("a.pdf", 2, 20, 200, pages),
            Err(RecordError::PageOutOfOrder {
                position: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_rejects_method_inconsistent_with_threshold() {
        let pages = vec![PageRecord::from_embedded_text(1, 5, "short".to_string())];
        assert_eq!(
            DocumentRecord::new("a.pdf", 1, 20, 200, pages),
            Err(RecordError::MethodMismatch { page: 1 })
        );
    }

    #[test]
    fn test_deserialize_rejects_wrong_ocr_count() {
        let mut value = serde_json::to_value(two_page_record()).unwrap();
        value["ocr_pages_count"] = json!(0);
        let err = serde_json::from_value::<DocumentRecord>(value).unwrap_err();
        assert!(err.to_string().contains("ocr_pages_count"));
    }

    #[test]
    fn test_deserialize_rejects_mismatched_key() {
        let mut value = serde_json::to_value(two_page_record()).unwrap();
        let pages = value["pages"].as_object_mut().unwrap();
        let page2 = pages.remove("page_2").unwrap();
        pages.insert("page_7".to_string(), page2);
        assert!(serde_json::from_value::<DocumentRecord>(value).is_err());
    }

    #[test]
    fn test_failed_ocr_page_keeps_image_path() {
        let page = PageRecord::ocr_failed(1, 0, "/tmp/p.jpg".into(), "engine crashed".into());
        assert_eq!(page.text, "");
        assert!(page.ocr_fragments.is_none());
        let record = DocumentRecord::new("a.pdf", 1, 20, 200, vec![page]).unwrap();
        assert_eq!(record.failed_pages().count(), 1);
        assert_eq!(record.ocr_pages_count(), 1);
    }
}
