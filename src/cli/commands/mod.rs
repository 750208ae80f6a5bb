//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract;
mod ocr;
mod records;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};
use crate::ocr::OcrBackendType;
use crate::pdf::TextBackendType;

#[derive(Parser)]
#[command(name = "pdfsift")]
#[command(about = "Per-page PDF text extraction with OCR fallback")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "PDFSIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF, OCR-ing pages without enough embedded text
    Extract {
        /// PDF file to extract
        pdf: PathBuf,
        /// Pages with fewer trimmed characters than this are OCR'd
        #[arg(long)]
        min_chars: Option<usize>,
        /// Resolution for rendered pages
        #[arg(long)]
        dpi: Option<u32>,
        /// Embedded-text backend
        #[arg(long, value_enum)]
        text_backend: Option<TextBackendType>,
        /// OCR engine
        #[arg(long, value_enum)]
        ocr_backend: Option<OcrBackendType>,
        /// OCR language (tesseract language code)
        #[arg(long)]
        lang: Option<String>,
        /// Also write the record JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not save the record to the record store
        #[arg(long)]
        no_store: bool,
    },

    /// OCR every page of a PDF, ignoring the text layer
    Ocr {
        /// PDF file to OCR
        pdf: PathBuf,
        /// Resolution for rendered pages
        #[arg(long)]
        dpi: Option<u32>,
        /// Write the results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage stored document records
    Records {
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Check availability of external tools and OCR engines
    Check,
}

#[derive(Subcommand)]
enum RecordCommands {
    /// List stored records
    List,
    /// Print a stored record as JSON
    Show {
        /// Document id
        id: String,
    },
    /// Delete a stored record
    Delete {
        /// Document id
        id: String,
    },
    /// Print the summarization prompt for a stored record
    Prompt {
        /// Document id
        id: String,
        /// What the summarizer should do with the document
        #[arg(short, long)]
        instruction: String,
        /// Maximum document characters included
        #[arg(long, default_value_t = crate::llm::DEFAULT_MAX_CONTENT_CHARS)]
        max_chars: usize,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, _config) = load_settings(&options).await?;

    match cli.command {
        Commands::Extract {
            pdf,
            min_chars,
            dpi,
            text_backend,
            ocr_backend,
            lang,
            output,
            no_store,
        } => {
            let overrides = extract::ExtractOverrides {
                min_chars,
                dpi,
                text_backend,
                ocr_backend,
                lang,
            };
            extract::cmd_extract(&settings, pdf, overrides, output, no_store).await
        }
        Commands::Ocr { pdf, dpi, output } => ocr::cmd_ocr(&settings, pdf, dpi, output).await,
        Commands::Records { command } => match command {
            RecordCommands::List => records::cmd_records_list(&settings).await,
            RecordCommands::Show { id } => records::cmd_records_show(&settings, &id).await,
            RecordCommands::Delete { id } => records::cmd_records_delete(&settings, &id).await,
            RecordCommands::Prompt {
                id,
                instruction,
                max_chars,
            } => records::cmd_records_prompt(&settings, &id, &instruction, max_chars).await,
        },
        Commands::Check => check::cmd_check(&settings).await,
    }
}
