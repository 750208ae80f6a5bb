//! Run identifiers.

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use crate::utils::file_stem_id;

/// Identifies one extraction run; doubles as the stored document id.
///
/// Shaped `<file stem>_<UTC %Y%m%d%H%M%S>_<8 hex>`, so ids sort by
/// document name and then by time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// New id for a run over the file shown as `display_name`.
    pub fn generate(display_name: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        RunId(format!(
            "{}_{}_{}",
            file_stem_id(display_name),
            Utc::now().format("%Y%m%d%H%M%S"),
            &suffix[..8]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
