//! Shared fixtures: in-memory PDFs and scripted pipeline stages.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use pdfsift::ocr::normalize::{NdArray, RawValue, ScalarValue};
use pdfsift::ocr::{OcrBackendType, OcrEngine, OcrError};
use pdfsift::pdf::{
    PageRasterizer, PageText, PdfDocument, PdfError, RasterError, TextBackend, TextBackendType,
};

#[path = "../../src/pdf/testing.rs"]
mod testing;

pub use testing::{build_pdf, TestPage};

/// A blank PDF with `n` pages written to `dir/name`.
pub fn write_blank_pdf(dir: &Path, name: &str, n: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let pages: Vec<TestPage<'_>> = (0..n).map(|_| TestPage::Blank).collect();
    std::fs::write(&path, build_pdf(&pages)).unwrap();
    path
}

/// Text backend returning fixed text per page (empty when unscripted).
pub struct ScriptedText {
    pages: HashMap<u32, String>,
}

impl ScriptedText {
    pub fn new(pages: &[(u32, &str)]) -> Self {
        Self {
            pages: pages.iter().map(|(n, t)| (*n, t.to_string())).collect(),
        }
    }
}

impl TextBackend for ScriptedText {
    fn backend_type(&self) -> TextBackendType {
        TextBackendType::Native
    }

    fn extract_page_text(&self, _doc: &PdfDocument, page: u32) -> Result<PageText, PdfError> {
        Ok(self
            .pages
            .get(&page)
            .map(|t| PageText::new(t.clone()))
            .unwrap_or_else(PageText::empty))
    }
}

/// Rasterizer that writes a placeholder image and records each call.
#[derive(Default)]
pub struct FakeRasterizer {
    fail_pages: HashSet<u32>,
    pub calls: Mutex<Vec<u32>>,
}

impl FakeRasterizer {
    pub fn failing_on(pages: &[u32]) -> Self {
        Self {
            fail_pages: pages.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        _doc: &PdfDocument,
        page: u32,
        _dpi: u32,
        output: &Path,
    ) -> Result<(), RasterError> {
        self.calls.lock().unwrap().push(page);
        if self.fail_pages.contains(&page) {
            return Err(RasterError::RenderFailed {
                page,
                reason: "simulated renderer crash".to_string(),
            });
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output, b"jpeg")?;
        Ok(())
    }
}

/// OCR engine answering per image file name (`page_<n>.jpg`).
#[derive(Default)]
pub struct FakeOcr {
    answers: HashMap<String, Result<RawValue, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeOcr {
    /// Recognize `lines` on page `n`, each as a fragment with confidence 0.9.
    pub fn with_page(mut self, n: u32, lines: &[&str]) -> Self {
        let detected = lines.iter().map(|l| detection_line(l, 0.9)).collect();
        self.answers.insert(
            format!("page_{}.jpg", n),
            Ok(RawValue::Seq(vec![RawValue::Seq(detected)])),
        );
        self
    }

    /// Answer page `n` with a raw engine value.
    pub fn with_raw(mut self, n: u32, value: RawValue) -> Self {
        self.answers.insert(format!("page_{}.jpg", n), Ok(value));
        self
    }

    /// Fail page `n` with an engine error.
    pub fn failing_on(mut self, n: u32, reason: &str) -> Self {
        self.answers
            .insert(format!("page_{}.jpg", n), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn detection_line(text: &str, confidence: f32) -> RawValue {
    RawValue::Seq(vec![
        RawValue::Array(NdArray::from_int_points(&[[10, 10], [200, 10], [200, 30], [10, 30]])),
        RawValue::Seq(vec![
            RawValue::Str(text.to_string()),
            RawValue::Scalar(ScalarValue::F32(confidence)),
        ]),
    ])
}

impl OcrEngine for FakeOcr {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "fake engine".to_string()
    }

    fn detect(&self, image_path: &Path) -> Result<RawValue, OcrError> {
        assert!(image_path.exists(), "OCR called before the page was rendered");
        let name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        self.calls.lock().unwrap().push(name.clone());
        match self.answers.get(&name) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(reason)) => Err(OcrError::OcrFailed(reason.clone())),
            None => Ok(RawValue::Null),
        }
    }
}
