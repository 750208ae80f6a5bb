//! Persistence for finished document records.
//!
//! Records are stored one JSON file per document id:
//! `{records_dir}/{id}.json`. Files are written to a temp file in the same
//! directory and renamed into place, so a record is either fully present
//! or absent.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::DocumentRecord;

const RECORD_EXTENSION: &str = "json";

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One line of a record listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub total_pages: u32,
    pub ocr_pages_count: usize,
    pub total_chars: usize,
}

impl RecordSummary {
    fn new(id: &str, record: &DocumentRecord) -> Self {
        Self {
            id: id.to_string(),
            total_pages: record.total_pages(),
            ocr_pages_count: record.ocr_pages_count(),
            total_chars: record.total_chars(),
        }
    }
}

/// Keyed storage of document records.
pub trait RecordStore: Send + Sync {
    /// Store `record` under `id`, replacing any previous record.
    fn save(&self, id: &str, record: &DocumentRecord) -> Result<(), StoreError>;

    /// Summaries of every stored record, sorted by id.
    fn list(&self) -> Result<Vec<RecordSummary>, StoreError>;

    fn get(&self, id: &str) -> Result<DocumentRecord, StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Record store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    records_dir: PathBuf,
}

impl FsRecordStore {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
        }
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Path a record with `id` is stored at.
    pub fn record_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self
            .records_dir
            .join(format!("{}.{}", id, RECORD_EXTENSION)))
    }
}

impl RecordStore for FsRecordStore {
    fn save(&self, id: &str, record: &DocumentRecord) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        let json = record.to_json_pretty()?;

        std::fs::create_dir_all(&self.records_dir)?;
        let mut tmp = NamedTempFile::new_in(&self.records_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!("Saved record {} to {}", id, path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<RecordSummary>, StoreError> {
        let entries = match std::fs::read_dir(&self.records_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.get(id) {
                Ok(record) => summaries.push(RecordSummary::new(id, &record)),
                Err(e) => tracing::warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    fn get(&self, id: &str) -> Result<DocumentRecord, StoreError> {
        let path = self.record_path(id)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    let invalid = id.is_empty()
        || id.contains(['/', '\\', '\0'])
        || id.contains("..")
        || id.starts_with('.');
    if invalid {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}
