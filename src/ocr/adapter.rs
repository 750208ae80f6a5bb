//! Turns raw engine output into record-ready OCR fragments.

use std::path::Path;

use super::backend::{OcrEngine, OcrError};
use super::fragments::{parse_detections, FragmentWarning};
use super::normalize::to_builtin;
use crate::models::{fragment_text, OcrFragment};

/// Fragments recognized on one image, plus any lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub fragments: Vec<OcrFragment>,
    pub warnings: Vec<FragmentWarning>,
}

impl OcrOutput {
    /// Fragment texts joined with single spaces, trailing whitespace removed.
    pub fn text(&self) -> String {
        fragment_text(&self.fragments)
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Runs an engine on page images and normalizes what it returns.
#[derive(Clone, Copy)]
pub struct OcrAdapter<'a> {
    engine: &'a dyn OcrEngine,
}

impl<'a> OcrAdapter<'a> {
    pub fn new(engine: &'a dyn OcrEngine) -> Self {
        Self { engine }
    }

    /// Recognize the text on one image.
    ///
    /// Only a failing engine call is an error. An image without text gives
    /// an empty output; malformed detection lines become warnings.
    pub fn recognize(&self, image_path: &Path) -> Result<OcrOutput, OcrError> {
        let raw = self.engine.detect(image_path)?;
        let (fragments, warnings) = parse_detections(&to_builtin(&raw));
        tracing::debug!(
            "{}: {} fragments, {} skipped lines from {}",
            self.engine.backend_type(),
            fragments.len(),
            warnings.len(),
            image_path.display()
        );
        Ok(OcrOutput {
            fragments,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::backend::OcrBackendType;
    use crate::ocr::normalize::{NdArray, RawValue, ScalarValue};

    struct CannedEngine(Result<RawValue, String>);

    impl OcrEngine for CannedEngine {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Tesseract
        }
        fn is_available(&self) -> bool {
            true
        }
        fn availability_hint(&self) -> String {
            String::new()
        }
        fn detect(&self, _image_path: &Path) -> Result<RawValue, OcrError> {
            self.0.clone().map_err(OcrError::OcrFailed)
        }
    }

    fn line(text: &[u8], conf: f32) -> RawValue {
        RawValue::Seq(vec![
            RawValue::Array(NdArray::from_float_points(&[[0.0, 0.0], [5.0, 0.0], [5.0, 5.0]])),
            RawValue::Seq(vec![
                RawValue::Bytes(text.to_vec()),
                RawValue::Scalar(ScalarValue::F32(conf)),
            ]),
        ])
    }

    #[test]
    fn test_recognize_normalizes_engine_values() {
        let engine = CannedEngine(Ok(RawValue::Seq(vec![RawValue::Seq(vec![
            line(b"Total", 0.95),
            line(b"due ", 0.5),
        ])])));
        let output = OcrAdapter::new(&engine).recognize(Path::new("p.jpg")).unwrap();
        assert_eq!(output.fragments.len(), 2);
        assert_eq!(output.fragments[0].confidence, 0.95);
        assert_eq!(output.text(), "Total due");
        assert!(output.warning_messages().is_empty());
    }

    #[test]
    fn test_null_result_is_empty_output() {
        let engine = CannedEngine(Ok(RawValue::Null));
        let output = OcrAdapter::new(&engine).recognize(Path::new("p.jpg")).unwrap();
        assert_eq!(output, OcrOutput::default());
        assert_eq!(output.text(), "");
    }

    #[test]
    fn test_engine_failure_propagates() {
        let engine = CannedEngine(Err("model crashed".to_string()));
        let err = OcrAdapter::new(&engine).recognize(Path::new("p.jpg")).unwrap_err();
        assert_eq!(err.to_string(), "OCR failed: model crashed");
    }

    #[test]
    fn test_bad_line_becomes_warning() {
        let engine = CannedEngine(Ok(RawValue::Seq(vec![RawValue::Seq(vec![
            line(b"kept", 0.8),
            RawValue::Str("garbage".to_string()),
        ])])));
        let output = OcrAdapter::new(&engine).recognize(Path::new("p.jpg")).unwrap();
        assert_eq!(output.text(), "kept");
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warning_messages()[0].starts_with("detection line 1 skipped"));
    }
}
