//! Tesseract OCR engine.
//!
//! Runs the `tesseract` binary with TSV output and regroups the word boxes
//! into lines, so the result has the same `[box, [text, confidence]]`
//! shape as the other engines.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use super::backend::{OcrBackendType, OcrConfig, OcrEngine, OcrError};
use super::normalize::{NdArray, RawValue, ScalarValue};
use crate::utils::check_binary;

/// TSV `level` of a single word.
const WORD_LEVEL: &str = "5";

/// Tesseract OCR engine.
pub struct TesseractEngine {
    config: OcrConfig,
    program: String,
}

impl TesseractEngine {
    /// Create a new Tesseract engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(OcrConfig::default())
    }

    /// Create a new Tesseract engine with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self {
            config,
            program: "tesseract".to_string(),
        }
    }

    /// Use a different tesseract executable.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Run Tesseract on an image file and return its TSV output.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.program)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .arg("tsv")
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary(&self.program)
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    fn detect(&self, image_path: &Path) -> Result<RawValue, OcrError> {
        let tsv = self.run_tesseract(image_path)?;
        Ok(parse_tsv(&tsv))
    }
}

#[derive(Default)]
struct LineAccumulator {
    words: Vec<String>,
    confidences: Vec<f64>,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl LineAccumulator {
    fn push(&mut self, word: &str, conf: f64, bbox: [i64; 4]) {
        let [left, top, width, height] = bbox;
        if self.words.is_empty() {
            self.left = left;
            self.top = top;
            self.right = left + width;
            self.bottom = top + height;
        } else {
            self.left = self.left.min(left);
            self.top = self.top.min(top);
            self.right = self.right.max(left + width);
            self.bottom = self.bottom.max(top + height);
        }
        self.words.push(word.to_string());
        self.confidences.push(conf);
    }

    fn into_line(self) -> RawValue {
        let mean = self.confidences.iter().sum::<f64>() / self.confidences.len() as f64;
        let polygon = NdArray::from_int_points(&[
            [self.left, self.top],
            [self.right, self.top],
            [self.right, self.bottom],
            [self.left, self.bottom],
        ]);
        RawValue::Seq(vec![
            RawValue::Array(polygon),
            RawValue::Seq(vec![
                RawValue::Str(self.words.join(" ")),
                RawValue::Scalar(ScalarValue::F32((mean / 100.0) as f32)),
            ]),
        ])
    }
}

/// Group Tesseract TSV word rows into detection lines.
///
/// Only word rows with a non-negative confidence and non-blank text count.
/// Each line gets the union box of its words and their mean confidence,
/// rescaled from Tesseract's 0-100 to 0-1.
pub fn parse_tsv(tsv: &str) -> RawValue {
    let mut lines: BTreeMap<(u32, u32, u32, u32), LineAccumulator> = BTreeMap::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }
        let text = cols[11].trim();
        let conf: f64 = match cols[10].trim().parse() {
            Ok(c) if c >= 0.0 => c,
            _ => continue,
        };
        if text.is_empty() {
            continue;
        }

        let key = match (
            cols[1].parse(),
            cols[2].parse(),
            cols[3].parse(),
            cols[4].parse(),
        ) {
            (Ok(page), Ok(block), Ok(par), Ok(line)) => (page, block, par, line),
            _ => continue,
        };
        let bbox = match (
            cols[6].parse(),
            cols[7].parse(),
            cols[8].parse(),
            cols[9].parse(),
        ) {
            (Ok(l), Ok(t), Ok(w), Ok(h)) => [l, t, w, h],
            _ => continue,
        };

        lines.entry(key).or_default().push(text, conf.min(100.0), bbox);
    }

    let detected: Vec<RawValue> = lines.into_values().map(LineAccumulator::into_line).collect();
    RawValue::Seq(vec![RawValue::Seq(detected)])
}
