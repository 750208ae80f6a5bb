//! Hybrid text extraction.
//!
//! Reads each page's embedded text first and only renders and OCRs the
//! pages whose trimmed text is shorter than the configured threshold.
//! Pages are processed one at a time in page order. Rendering or OCR
//! failures are written into the page record; only a document that cannot
//! be opened (or a text backend that cannot run at all) fails the run.

mod run;
mod types;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::{DocumentRecord, ExtractionMethod, PageRecord, RecordError};
use crate::ocr::{OcrAdapter, OcrEngine};
use crate::pdf::{PageRasterizer, PageText, PdfDocument, PdfError, TextBackend};

pub use run::RunId;
pub use types::{ExtractionEvent, PageState};

/// File name an uploaded PDF is stored under inside its run directory.
pub const SOURCE_FILE_NAME: &str = "source.pdf";

/// Run-level failures. Page-level problems never end up here.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("Scratch directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Inconsistent document record: {0}")]
    Record(#[from] RecordError),

    #[error("Page {page} was left unresolved")]
    Unresolved { page: u32 },
}

impl ExtractionError {
    /// Whether the input could not be opened as a PDF.
    pub fn is_document_open(&self) -> bool {
        matches!(self, ExtractionError::Pdf(PdfError::DocumentOpen { .. }))
    }
}

/// Per-run settings, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Pages with fewer trimmed embedded characters go to OCR.
    pub min_chars_threshold: usize,
    /// Resolution for rendered pages.
    pub dpi: u32,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            min_chars_threshold: 20,
            dpi: 200,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct ExtractionRun {
    pub run_id: RunId,
    pub record: DocumentRecord,
}

/// Per-page decision engine: embedded text when sufficient, OCR otherwise.
pub struct HybridExtractor<'a> {
    text_backend: &'a dyn TextBackend,
    rasterizer: &'a dyn PageRasterizer,
    ocr: OcrAdapter<'a>,
    scratch_dir: PathBuf,
    options: ExtractionOptions,
    event_tx: Option<mpsc::UnboundedSender<ExtractionEvent>>,
}

impl<'a> HybridExtractor<'a> {
    /// Create an extractor writing rendered pages under `scratch_dir`.
    pub fn new(
        text_backend: &'a dyn TextBackend,
        rasterizer: &'a dyn PageRasterizer,
        engine: &'a dyn OcrEngine,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            text_backend,
            rasterizer,
            ocr: OcrAdapter::new(engine),
            scratch_dir: scratch_dir.into(),
            options: ExtractionOptions::default(),
            event_tx: None,
        }
    }

    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Report progress on `event_tx`.
    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<ExtractionEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Directory holding the artifacts of run `run_id`.
    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.scratch_dir.join(run_id.as_str())
    }

    /// Extract a PDF on disk.
    pub fn extract_path(&self, path: &Path) -> Result<ExtractionRun, ExtractionError> {
        let doc = PdfDocument::open(path)?;
        let run_id = RunId::generate(&path.to_string_lossy());
        self.run(run_id, &doc)
    }

    /// Extract an uploaded PDF.
    ///
    /// The bytes are validated before anything is written; a valid upload
    /// is stored as `<run dir>/source.pdf`, which becomes the record's path.
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<ExtractionRun, ExtractionError> {
        let run_id = RunId::generate(display_name);
        let run_dir = self.run_dir(&run_id);
        let source = run_dir.join(SOURCE_FILE_NAME);

        let doc = PdfDocument::from_bytes(bytes, &source)?;
        std::fs::create_dir_all(&run_dir)?;
        std::fs::write(&source, bytes)?;

        self.run(run_id, &doc)
    }

    fn run(&self, run_id: RunId, doc: &PdfDocument) -> Result<ExtractionRun, ExtractionError> {
        let total_pages = doc.page_count();
        let run_dir = self.run_dir(&run_id);
        tracing::info!(
            "Run {}: {} pages from {} (min_chars={}, dpi={})",
            run_id,
            total_pages,
            doc.path().display(),
            self.options.min_chars_threshold,
            self.options.dpi
        );
        self.emit(ExtractionEvent::RunStarted {
            run_id: run_id.to_string(),
            total_pages,
        });

        let mut pages = Vec::with_capacity(total_pages as usize);
        for page_number in 1..=total_pages {
            let text = self.text_backend.extract_page_text(doc, page_number)?;
            let state = self.advance(doc, &run_dir, page_number, PageState::Pending(text));
            let record = state.finish(page_number)?;
            self.emit(ExtractionEvent::for_page(&record));
            pages.push(record);
        }

        let record = DocumentRecord::new(
            doc.path().display().to_string(),
            total_pages,
            self.options.min_chars_threshold,
            self.options.dpi,
            pages,
        )?;

        let failed_pages = record.failed_pages().count();
        tracing::info!(
            "Run {} complete: {} OCR pages, {} failed",
            run_id,
            record.ocr_pages_count(),
            failed_pages
        );
        self.emit(ExtractionEvent::RunCompleted {
            run_id: run_id.to_string(),
            ocr_pages: record.ocr_pages_count(),
            failed_pages,
        });

        Ok(ExtractionRun { run_id, record })
    }

    /// Take one decision step. Resolved states are terminal.
    fn advance(
        &self,
        doc: &PdfDocument,
        run_dir: &Path,
        page_number: u32,
        state: PageState,
    ) -> PageState {
        let PageText { text, char_count } = match state {
            PageState::Pending(text) => text,
            resolved => return resolved,
        };

        match ExtractionMethod::for_char_count(char_count, self.options.min_chars_threshold) {
            ExtractionMethod::Text => {
                tracing::debug!("Page {}: {} chars, using text layer", page_number, char_count);
                PageState::ResolvedText(PageRecord::from_embedded_text(
                    page_number,
                    char_count,
                    text,
                ))
            }
            ExtractionMethod::Ocr => {
                tracing::debug!("Page {}: {} chars, running OCR", page_number, char_count);
                PageState::ResolvedOcr(self.ocr_page(doc, run_dir, page_number, char_count))
            }
        }
    }

    fn ocr_page(
        &self,
        doc: &PdfDocument,
        run_dir: &Path,
        page_number: u32,
        char_count: usize,
    ) -> PageRecord {
        let image_path = run_dir.join(format!("page_{}.jpg", page_number));
        let image = image_path.display().to_string();

        if let Err(e) = self
            .rasterizer
            .rasterize(doc, page_number, self.options.dpi, &image_path)
        {
            tracing::warn!("Page {}: rendering failed: {}", page_number, e);
            return PageRecord::ocr_failed(page_number, char_count, image, e.to_string());
        }

        match self.ocr.recognize(&image_path) {
            Ok(output) => {
                let warnings = output.warning_messages();
                PageRecord::from_ocr(page_number, char_count, image, output.fragments, warnings)
            }
            Err(e) => {
                tracing::warn!("Page {}: OCR failed: {}", page_number, e);
                PageRecord::ocr_failed(page_number, char_count, image, e.to_string())
            }
        }
    }

    fn emit(&self, event: ExtractionEvent) {
        if let Some(tx) = &self.event_tx {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }
}
