//! Hybrid extraction command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;
use tokio::sync::mpsc;

use crate::cli::progress::spawn_event_renderer;
use crate::config::Settings;
use crate::ocr::{shared_engine, OcrBackendType};
use crate::pdf::{PdftoppmRasterizer, TextBackendType};
use crate::services::HybridExtractor;
use crate::storage::{FsRecordStore, RecordStore};

/// Per-invocation overrides from command-line flags.
#[derive(Debug, Default)]
pub struct ExtractOverrides {
    pub min_chars: Option<usize>,
    pub dpi: Option<u32>,
    pub text_backend: Option<TextBackendType>,
    pub ocr_backend: Option<OcrBackendType>,
    pub lang: Option<String>,
}

impl ExtractOverrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(min_chars) = self.min_chars {
            settings.min_chars_threshold = min_chars;
        }
        if let Some(dpi) = self.dpi {
            settings.dpi = dpi;
        }
        if let Some(backend) = self.text_backend {
            settings.text_backend = backend;
        }
        if let Some(backend) = self.ocr_backend {
            settings.ocr_backend = backend;
        }
        if let Some(lang) = self.lang {
            settings.ocr_language = lang;
        }
    }
}

/// Extract a PDF and store (and/or write) its record.
pub async fn cmd_extract(
    settings: &Settings,
    pdf: PathBuf,
    overrides: ExtractOverrides,
    output: Option<PathBuf>,
    no_store: bool,
) -> anyhow::Result<()> {
    let mut settings = settings.clone();
    overrides.apply(&mut settings);
    settings.validate()?;
    settings
        .ensure_directories()
        .context("Failed to create data directories")?;

    let engine = shared_engine(&settings.ocr_config())?;
    if !engine.is_available() {
        eprintln!(
            "{} {} (pages needing OCR will record an error)",
            style("!").yellow(),
            engine.availability_hint()
        );
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let renderer = spawn_event_renderer(event_rx);

    let worker_settings = settings.clone();
    let result = tokio::task::spawn_blocking(move || {
        let text_backend = worker_settings.text_backend.build();
        let rasterizer = PdftoppmRasterizer::new();
        HybridExtractor::new(
            text_backend.as_ref(),
            &rasterizer,
            engine,
            &worker_settings.scratch_dir,
        )
        .with_options(worker_settings.extraction_options())
        .with_events(event_tx)
        .extract_path(&pdf)
    })
    .await?;
    renderer.await?;
    let run = result?;

    let json = run.record.to_json_pretty()?;

    if !no_store {
        let store = FsRecordStore::new(&settings.records_dir);
        store.save(run.run_id.as_str(), &run.record)?;
        println!("{} Document id: {}", style("✓").green(), style(&run.run_id).bold());
    }

    let summary = format!(
        "  {} of {} pages used OCR",
        run.record.ocr_pages_count(),
        run.record.total_pages()
    );
    match output {
        Some(path) => {
            tokio::fs::write(&path, format!("{}\n", json))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("  Record written to {}", path.display());
            println!("{}", summary);
        }
        // Stdout carries the JSON; keep it parseable.
        None if no_store => {
            println!("{}", json);
            eprintln!("{}", summary);
        }
        None => println!("{}", summary),
    }
    Ok(())
}
