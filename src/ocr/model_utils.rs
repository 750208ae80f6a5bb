//! Model file management for engines that load ONNX models.
//!
//! Locates model directories in the standard places and downloads missing
//! files with curl (or wget as a fallback).

use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::OcrError;

/// A model file and where to fetch it.
pub struct ModelSpec {
    pub url: &'static str,
    pub filename: &'static str,
    /// Approximate size, shown while fetching.
    pub size_hint: &'static str,
}

/// Where an engine keeps its models.
pub struct ModelDirConfig {
    /// Subdirectory name under the pdfsift data dir (e.g. "paddle-ocr").
    pub subdir: &'static str,
    /// Files that must all be present for a directory to count.
    pub required_files: &'static [&'static str],
}

impl ModelDirConfig {
    /// Default model directory for this engine.
    pub fn default_dir(&self) -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("pdfsift")
            .join(self.subdir)
            .join("models")
    }

    /// Standard directories to search, most specific first.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        [
            Some(self.default_dir()),
            dirs::data_dir().map(|d| d.join(self.subdir).join("models")),
            dirs::home_dir().map(|d| d.join(format!(".{}", self.subdir)).join("models")),
            Some(PathBuf::from(format!("/usr/share/{}/models", self.subdir))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn has_required_files(&self, dir: &Path) -> bool {
        self.required_files.iter().all(|file| dir.join(file).is_file())
    }

    /// First directory holding a complete model set, preferring `configured`.
    pub fn find(&self, configured: Option<&Path>) -> Option<PathBuf> {
        configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(self.candidate_dirs())
            .find(|dir| self.has_required_files(dir))
    }
}

/// Downloaders tried in order, with the flags that write to a file.
const DOWNLOADERS: &[(&str, &[&str])] = &[
    ("curl", &["-fSL", "--silent", "--show-error", "-o"]),
    ("wget", &["-q", "-O"]),
];

/// Fetch `url` into `dest` with the first downloader found on PATH.
///
/// The body lands in `<dest>.part` and is renamed once complete, so an
/// interrupted download never leaves a truncated model behind.
pub fn download_file(url: &str, dest: &Path) -> Result<(), OcrError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let partial = dest.with_extension("part");

    for (program, args) in DOWNLOADERS {
        let status = match Command::new(program).args(*args).arg(&partial).arg(url).status() {
            Ok(status) => status,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(OcrError::Io(e)),
        };
        if !status.success() {
            let _ = std::fs::remove_file(&partial);
            return Err(OcrError::ModelNotFound(format!(
                "{} could not fetch {} ({})",
                program, url, status
            )));
        }
        std::fs::rename(&partial, dest)?;
        return Ok(());
    }

    Err(OcrError::BackendNotAvailable(
        "Neither curl nor wget found. Install one to download models.".to_string(),
    ))
}

/// Path of `spec` inside `model_dir`, downloading it first when absent.
pub fn ensure_model_file(spec: &ModelSpec, model_dir: &Path) -> Result<PathBuf, OcrError> {
    let dest = model_dir.join(spec.filename);
    if dest.exists() {
        return Ok(dest);
    }
    tracing::info!("Fetching OCR model {} (~{})", spec.filename, spec.size_hint);
    download_file(spec.url, &dest)?;
    tracing::debug!("Stored {} at {}", spec.filename, dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: ModelDirConfig = ModelDirConfig {
        subdir: "test-engine",
        required_files: &["det.onnx", "rec.onnx"],
    };

    #[test]
    fn test_configured_dir_needs_every_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("det.onnx"), b"").unwrap();
        assert!(!CONFIG.has_required_files(temp.path()));
        assert_ne!(CONFIG.find(Some(temp.path())).as_deref(), Some(temp.path()));

        std::fs::write(temp.path().join("rec.onnx"), b"").unwrap();
        assert_eq!(CONFIG.find(Some(temp.path())).as_deref(), Some(temp.path()));
    }

    #[test]
    fn test_existing_model_is_not_downloaded() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("det.onnx"), b"model").unwrap();
        let spec = ModelSpec {
            url: "http://invalid.invalid/det.onnx",
            filename: "det.onnx",
            size_hint: "1 KB",
        };
        let path = ensure_model_file(&spec, temp.path()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"model");
    }
}
