//! Whole-document OCR command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use crate::config::Settings;
use crate::ocr::shared_engine;
use crate::pdf::{PdfDocument, PdftoppmRasterizer};
use crate::services::{ocr_all_pages, RunId};

/// OCR every page of a PDF and print or write the per-image results.
pub async fn cmd_ocr(
    settings: &Settings,
    pdf: PathBuf,
    dpi: Option<u32>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut settings = settings.clone();
    if let Some(dpi) = dpi {
        settings.dpi = dpi;
    }
    settings.validate()?;

    let engine = shared_engine(&settings.ocr_config())?;
    let run_dir = settings
        .scratch_dir
        .join(RunId::generate(&pdf.to_string_lossy()).as_str());
    let dpi = settings.dpi;

    let results = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let doc = PdfDocument::open(&pdf)?;
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("Failed to create {}", run_dir.display()))?;
        let rasterizer = PdftoppmRasterizer::new();
        Ok(ocr_all_pages(&doc, &rasterizer, engine, &run_dir, dpi))
    })
    .await??;

    let failed = results.values().filter(|o| o.is_failed()).count();
    let json = serde_json::to_string_pretty(&results)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, format!("{}\n", json))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} OCR'd {} pages ({} failed), results in {}",
                style("✓").green(),
                results.len(),
                failed,
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
