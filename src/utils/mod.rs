//! Shared utility functions.
//!
//! - `sanitize_id`: turn arbitrary file names into path-safe identifiers
//! - `check_binary`: probe `PATH` for the external tools we shell out to

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Longest identifier stem we keep, in characters.
const MAX_ID_CHARS: usize = 64;

/// Anything that is not a letter, digit, `.`, `_` or `-`, plus runs of dots.
fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^\p{Alphabetic}\p{N}._-]+|\.{2,}").expect("static regex")
    })
}

fn underscore_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_{2,}").expect("static regex"))
}

/// Make a path-safe identifier from a display name.
///
/// Letters and digits from any script are kept. Runs of unsupported
/// characters and runs of dots collapse to a single `_`, so the result never
/// contains `..`; leading dots and underscores are dropped.
pub fn sanitize_id(name: &str) -> String {
    let replaced = unsafe_chars().replace_all(name.trim(), "_");
    let collapsed = underscore_runs().replace_all(&replaced, "_");
    let trimmed = collapsed.trim_start_matches(['.', '_']).trim_end_matches('_');
    let limited: String = trimmed.chars().take(MAX_ID_CHARS).collect();
    if limited.is_empty() {
        "document".to_string()
    } else {
        limited
    }
}

/// File stem of a display name or path, sanitized for use in identifiers.
pub fn file_stem_id(display_name: &str) -> String {
    let stem = Path::new(display_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(display_name);
    sanitize_id(stem)
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}
