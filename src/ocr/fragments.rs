//! Reading OCR fragments out of a normalized detection result.
//!
//! The expected shape is a list of pages, of which only the first is read;
//! each page is a list of lines shaped `[box, [text, confidence]]` where
//! `box` is a list of `[x, y]` points. Lines that do not fit are skipped
//! with a warning so one bad detection never costs the rest of the page.

use serde_json::Value;
use thiserror::Error;

use crate::models::OcrFragment;

/// A detection line that was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FragmentWarning {
    #[error("detection result is not a list (found {found})")]
    UnexpectedResult { found: &'static str },

    #[error("detection line {index} skipped: {reason}")]
    MalformedLine { index: usize, reason: String },
}

/// Parse a normalized detection result into fragments.
///
/// `null`, an empty list, or a first page that is `null`/empty all mean no
/// text was found and yield zero fragments without warnings.
pub fn parse_detections(result: &Value) -> (Vec<OcrFragment>, Vec<FragmentWarning>) {
    let mut fragments = Vec::new();
    let mut warnings = Vec::new();

    let lines = match result {
        Value::Null => return (fragments, warnings),
        Value::Array(pages) => match pages.first() {
            None | Some(Value::Null) => return (fragments, warnings),
            Some(Value::Array(lines)) => lines,
            Some(other) => {
                warnings.push(FragmentWarning::UnexpectedResult {
                    found: kind(other),
                });
                return (fragments, warnings);
            }
        },
        other => {
            warnings.push(FragmentWarning::UnexpectedResult {
                found: kind(other),
            });
            return (fragments, warnings);
        }
    };

    for (index, line) in lines.iter().enumerate() {
        match parse_line(line) {
            Ok(fragment) => fragments.push(fragment),
            Err(reason) => {
                tracing::warn!("Skipping OCR line {}: {}", index, reason);
                warnings.push(FragmentWarning::MalformedLine { index, reason });
            }
        }
    }

    (fragments, warnings)
}

fn parse_line(line: &Value) -> Result<OcrFragment, String> {
    let parts = line
        .as_array()
        .ok_or_else(|| format!("expected [box, [text, confidence]], found {}", kind(line)))?;
    if parts.len() < 2 {
        return Err(format!("expected 2 elements, found {}", parts.len()));
    }

    let bounding_polygon = parse_box(&parts[0])?;

    let recognition = parts[1]
        .as_array()
        .filter(|r| r.len() >= 2)
        .ok_or_else(|| "recognition is not a [text, confidence] pair".to_string())?;
    let text = recognition[0]
        .as_str()
        .ok_or_else(|| format!("text is {}, not a string", kind(&recognition[0])))?
        .to_string();
    let confidence = recognition[1]
        .as_f64()
        .ok_or_else(|| format!("confidence is {}, not a number", kind(&recognition[1])))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(format!("confidence {} outside [0, 1]", confidence));
    }

    Ok(OcrFragment {
        bounding_polygon,
        text,
        confidence,
    })
}

fn parse_box(value: &Value) -> Result<Vec<[f64; 2]>, String> {
    let points = value
        .as_array()
        .ok_or_else(|| format!("box is {}, not a list of points", kind(value)))?;
    if points.is_empty() {
        return Err("box has no points".to_string());
    }

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let coords = point
                .as_array()
                .filter(|c| c.len() == 2)
                .ok_or_else(|| format!("box point {} is not an [x, y] pair", i))?;
            match (coords[0].as_f64(), coords[1].as_f64()) {
                (Some(x), Some(y)) => Ok([x, y]),
                _ => Err(format!("box point {} has non-numeric coordinates", i)),
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
