//! Whole-document OCR: every page rendered and recognized, no text layer.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::OcrFragment;
use crate::ocr::{OcrAdapter, OcrEngine};
use crate::pdf::{PageRasterizer, PdfDocument};

/// OCR result of one page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageOcrOutcome {
    Fragments(Vec<OcrFragment>),
    Failed { error: String },
}

impl PageOcrOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PageOcrOutcome::Failed { .. })
    }
}

/// Render every page of `doc` into `output_dir` and OCR each image.
///
/// Results are keyed by image file name (`page_<n>.jpg`). A page that
/// fails to render or recognize records its error and the batch moves on.
pub fn ocr_all_pages(
    doc: &PdfDocument,
    rasterizer: &dyn PageRasterizer,
    engine: &dyn OcrEngine,
    output_dir: &Path,
    dpi: u32,
) -> BTreeMap<String, PageOcrOutcome> {
    let adapter = OcrAdapter::new(engine);
    let mut results = BTreeMap::new();

    for page_number in 1..=doc.page_count() {
        let file_name = format!("page_{}.jpg", page_number);
        let image_path = output_dir.join(&file_name);

        let outcome = match rasterizer.rasterize(doc, page_number, dpi, &image_path) {
            Err(e) => PageOcrOutcome::Failed {
                error: e.to_string(),
            },
            Ok(()) => match adapter.recognize(&image_path) {
                Ok(output) => PageOcrOutcome::Fragments(output.fragments),
                Err(e) => PageOcrOutcome::Failed {
                    error: e.to_string(),
                },
            },
        };

        if let PageOcrOutcome::Failed { error } = &outcome {
            tracing::warn!("{}: {}", file_name, error);
        }
        results.insert(file_name, outcome);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_json_shapes() {
        let ok = PageOcrOutcome::Fragments(vec![OcrFragment {
            bounding_polygon: vec![[1.0, 2.0]],
            text: "hi".to_string(),
            confidence: 0.5,
        }]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!([{"box": [[1.0, 2.0]], "text": "hi", "confidence": 0.5}])
        );

        let failed = PageOcrOutcome::Failed {
            error: "no image".to_string(),
        };
        assert!(failed.is_failed());
        assert_eq!(serde_json::to_value(&failed).unwrap(), json!({"error": "no image"}));
    }
}
