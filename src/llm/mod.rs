//! Inputs for the summarization collaborator.
//!
//! pdfsift does not call a model; it only assembles the prompt a
//! summarizer consumes from a stored document record.

pub mod prompts;

pub use prompts::{build_summary_prompt, SummaryPrompt, DEFAULT_MAX_CONTENT_CHARS};
