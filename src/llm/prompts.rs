//! Prompt assembly for the summarization collaborator.

use crate::models::DocumentRecord;

/// System prompt sent with every summary request.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an assistant that summarizes PDF contents.";

/// Default limit on document text included in a prompt, in characters.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 8000;

/// A chat-style prompt: system instruction plus one user message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SummaryPrompt {
    pub system: String,
    pub user: String,
}

/// Build the summary prompt for a record.
///
/// Page texts are joined in page order with newlines and cut to
/// `max_chars` characters before being appended under the instruction.
pub fn build_summary_prompt(
    record: &DocumentRecord,
    instruction: &str,
    max_chars: usize,
) -> SummaryPrompt {
    let text = record.full_text();
    SummaryPrompt {
        system: SUMMARY_SYSTEM_PROMPT.to_string(),
        user: format!("{}\n---\n{}", instruction, truncate_chars(&text, max_chars)),
    }
}

/// Truncate to at most `max_chars` characters (UTF-8 safe).
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
