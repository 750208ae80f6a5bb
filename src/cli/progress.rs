//! Progress display for extraction runs.
//!
//! Everything here goes to stderr: `extract --no-store` prints the record
//! JSON on stdout.

use std::io::Write;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::ExtractionMethod;
use crate::services::ExtractionEvent;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

/// Render extraction events on stderr until the sender side is dropped.
pub fn spawn_event_renderer(event_rx: mpsc::UnboundedReceiver<ExtractionEvent>) -> JoinHandle<()> {
    spawn_event_renderer_to(event_rx, std::io::stderr())
}

/// Render extraction events, writing status lines to `out`.
fn spawn_event_renderer_to<W>(
    mut event_rx: mpsc::UnboundedReceiver<ExtractionEvent>,
    mut out: W,
) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut progress: Option<ProgressBar> = None;

        while let Some(event) = event_rx.recv().await {
            match event {
                ExtractionEvent::RunStarted {
                    run_id,
                    total_pages,
                } => {
                    let _ = writeln!(
                        out,
                        "{} Extracting {} pages (run {})",
                        style("→").cyan(),
                        total_pages,
                        run_id
                    );
                    let bar = ProgressBar::new(u64::from(total_pages));
                    bar.set_style(bar_style());
                    bar.set_message("Pages");
                    progress = Some(bar);
                }
                ExtractionEvent::PageResolved {
                    page_number,
                    method,
                    ..
                } => {
                    if let Some(ref bar) = progress {
                        if method == ExtractionMethod::Ocr {
                            bar.set_message(format!("OCR page {}", page_number));
                        }
                        bar.inc(1);
                    }
                }
                ExtractionEvent::PageFailed { page_number, error } => {
                    let line = format!("  {} Page {}: {}", style("✗").red(), page_number, error);
                    match progress {
                        Some(ref bar) => {
                            bar.suspend(|| writeln!(out, "{}", line).ok());
                            bar.inc(1);
                        }
                        None => {
                            let _ = writeln!(out, "{}", line);
                        }
                    }
                }
                ExtractionEvent::RunCompleted {
                    ocr_pages,
                    failed_pages,
                    ..
                } => {
                    if let Some(bar) = progress.take() {
                        bar.finish_and_clear();
                    }
                    let _ = writeln!(
                        out,
                        "{} Done: {} pages needed OCR, {} failed",
                        style("✓").green(),
                        ocr_pages,
                        failed_pages
                    );
                }
            }
        }

        if let Some(bar) = progress {
            bar.abandon();
        }
    })
}
