//! Record store commands.

use console::style;

use crate::config::Settings;
use crate::llm::build_summary_prompt;
use crate::storage::{FsRecordStore, RecordStore};

fn store(settings: &Settings) -> FsRecordStore {
    FsRecordStore::new(&settings.records_dir)
}

/// List stored records.
pub async fn cmd_records_list(settings: &Settings) -> anyhow::Result<()> {
    let summaries = store(settings).list()?;

    if summaries.is_empty() {
        println!(
            "{} No records in {}",
            style("!").yellow(),
            settings.records_dir.display()
        );
        return Ok(());
    }

    println!(
        "{:<48} {:>6} {:>6} {:>10}",
        style("ID").bold(),
        style("PAGES").bold(),
        style("OCR").bold(),
        style("CHARS").bold()
    );
    for summary in &summaries {
        println!(
            "{:<48} {:>6} {:>6} {:>10}",
            summary.id, summary.total_pages, summary.ocr_pages_count, summary.total_chars
        );
    }
    println!("\n{} records", summaries.len());
    Ok(())
}

/// Print a record as JSON.
pub async fn cmd_records_show(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let record = store(settings).get(id)?;
    println!("{}", record.to_json_pretty()?);
    Ok(())
}

/// Delete a record.
pub async fn cmd_records_delete(settings: &Settings, id: &str) -> anyhow::Result<()> {
    store(settings).delete(id)?;
    println!("{} Deleted {}", style("✓").green(), id);
    Ok(())
}

/// Print the summary prompt for a record.
pub async fn cmd_records_prompt(
    settings: &Settings,
    id: &str,
    instruction: &str,
    max_chars: usize,
) -> anyhow::Result<()> {
    let record = store(settings).get(id)?;
    let prompt = build_summary_prompt(&record, instruction, max_chars);
    println!("{}", serde_json::to_string_pretty(&prompt)?);
    Ok(())
}
