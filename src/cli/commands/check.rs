//! Tool availability check.

use console::style;

use crate::config::Settings;
use crate::ocr::{OcrEngine, TesseractEngine};
use crate::utils::check_binary;

/// External tools the pipeline shells out to.
const TOOLS: [(&str, &str); 3] = [
    ("pdftotext", "layout text backend"),
    ("pdftoppm", "page rendering"),
    ("tesseract", "tesseract OCR"),
];

/// Report which tools and OCR engines are usable.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Tool Status").bold());
    println!("{}", "-".repeat(50));

    let mut all_found = true;
    for (tool, purpose) in TOOLS {
        let status = if check_binary(tool) {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<12} {:<14} {}", tool, status, style(purpose).dim());
    }

    println!("\n{}", style("OCR Engines:").cyan());
    let tesseract = TesseractEngine::with_config(settings.ocr_config());
    print_engine("Tesseract", &tesseract);

    #[cfg(feature = "ocr-paddle")]
    {
        let paddle = crate::ocr::PaddleEngine::with_config(settings.ocr_config());
        print_engine("PaddleOCR", &paddle);
    }
    #[cfg(not(feature = "ocr-paddle"))]
    println!(
        "  {:<12} {}",
        "PaddleOCR",
        style("not compiled (enable ocr-paddle feature)").dim()
    );

    println!("\n{}", style("Configured:").cyan());
    println!(
        "  text backend {}, OCR engine {}, min chars {}, dpi {}",
        settings.text_backend, settings.ocr_backend, settings.min_chars_threshold, settings.dpi
    );

    println!();
    if all_found {
        println!("{} All external tools are available", style("✓").green());
    } else {
        println!(
            "{} Some tools are missing. Install poppler-utils and tesseract-ocr.",
            style("!").yellow()
        );
    }
    Ok(())
}

fn print_engine(name: &str, engine: &dyn OcrEngine) {
    let status = if engine.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<12} {}", name, status);
    println!("               {}", style(engine.availability_hint()).dim());
}
