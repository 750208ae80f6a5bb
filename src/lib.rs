//! pdfsift - per-page PDF text extraction with OCR fallback.
//!
//! Each page's embedded text layer is read first. Pages whose trimmed text
//! is shorter than a threshold are rendered and run through OCR instead,
//! and the results are merged into one `DocumentRecord` per PDF.
//!
//! ```no_run
//! use std::path::Path;
//! use pdfsift::ocr::{shared_engine, OcrConfig};
//! use pdfsift::pdf::{NativeTextBackend, PdftoppmRasterizer};
//! use pdfsift::services::HybridExtractor;
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = shared_engine(&OcrConfig::default())?;
//! let text = NativeTextBackend::new();
//! let rasterizer = PdftoppmRasterizer::new();
//! let run = HybridExtractor::new(&text, &rasterizer, engine, "/tmp/pdfsift")
//!     .extract_path(Path::new("scan.pdf"))?;
//! println!("{} pages needed OCR", run.record.ocr_pages_count());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod services;
pub mod storage;
pub mod utils;
