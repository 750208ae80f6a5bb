//! Configuration management for pdfsift using the prefer crate.
//!
//! Settings are layered, later layers winning:
//! 1. built-in defaults
//! 2. a config file (TOML, YAML or JSON), discovered by prefer or given
//!    explicitly with `--config`
//! 3. `PDFSIFT_*` environment variables
//! 4. command-line flags (applied by the CLI)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::{OcrBackendType, OcrConfig};
use crate::pdf::TextBackendType;
use crate::services::ExtractionOptions;

/// Default minimum trimmed characters for a page to skip OCR.
pub const DEFAULT_MIN_CHARS: usize = 20;

/// Default render resolution.
pub const DEFAULT_DPI: u32 = 200;

/// Render resolutions outside this range work but are rarely useful.
pub const RECOMMENDED_DPI: std::ops::RangeInclusive<u32> = 120..=300;

const SCRATCH_SUBDIR: &str = "scratch";
const RECORDS_SUBDIR: &str = "records";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        format: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Per-run scratch directories (rendered pages, uploaded sources).
    pub scratch_dir: PathBuf,
    /// Stored document records.
    pub records_dir: PathBuf,
    /// Pages with fewer trimmed embedded characters are OCR'd.
    pub min_chars_threshold: usize,
    /// Resolution for rendered pages.
    pub dpi: u32,
    /// Embedded-text backend.
    pub text_backend: TextBackendType,
    /// OCR engine.
    pub ocr_backend: OcrBackendType,
    /// OCR language hint.
    pub ocr_language: String,
    /// Model directory for engines that need one.
    pub ocr_model_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdfsift");
        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            scratch_dir: data_dir.join(SCRATCH_SUBDIR),
            records_dir: data_dir.join(RECORDS_SUBDIR),
            data_dir,
            min_chars_threshold: DEFAULT_MIN_CHARS,
            dpi: DEFAULT_DPI,
            text_backend: TextBackendType::default(),
            ocr_backend: OcrBackendType::default(),
            ocr_language: "eng".to_string(),
            ocr_model_dir: None,
        }
    }

    /// Reject unusable values; warn about unusual ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dpi == 0 {
            return Err(ConfigError::Invalid("dpi must be greater than 0".to_string()));
        }
        if !RECOMMENDED_DPI.contains(&self.dpi) {
            tracing::warn!(
                "dpi {} is outside the recommended range {}-{}",
                self.dpi,
                RECOMMENDED_DPI.start(),
                RECOMMENDED_DPI.end()
            );
        }
        if self.ocr_language.trim().is_empty() {
            return Err(ConfigError::Invalid("OCR language must not be empty".to_string()));
        }
        Ok(())
    }

    /// Ensure the scratch and records directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        std::fs::create_dir_all(&self.records_dir)?;
        Ok(())
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions {
            min_chars_threshold: self.min_chars_threshold,
            dpi: self.dpi,
        }
    }

    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            backend: self.ocr_backend,
            language: self.ocr_language.clone(),
            model_path: self.ocr_model_dir.clone(),
        }
    }
}

/// Configuration file structure. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Scratch directory (defaults to `<data_dir>/scratch`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<String>,
    /// Records directory (defaults to `<data_dir>/records`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_dir: Option<String>,
    /// OCR trigger threshold.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "min_chars_threshold")]
    pub min_chars: Option<usize>,
    /// Render resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    /// Embedded-text backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_backend: Option<TextBackendType>,
    /// OCR engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_backend: Option<OcrBackendType>,
    /// OCR language hint.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "lang")]
    pub ocr_language: Option<String>,
    /// OCR model directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_model_dir: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    ///
    /// A discovered file that fails to parse is reported and ignored.
    pub async fn load() -> Self {
        match prefer::load("pdfsift").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the file extension; anything unknown is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            format,
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Apply `PDFSIFT_*` environment variables on top of the file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(key: &str, value: String) -> Option<T> {
            let result = value.trim().parse().ok();
            if result.is_none() {
                tracing::warn!("Ignoring {}={:?}: not a valid number", key, value);
            }
            result
        }

        if let Some(v) = lookup("PDFSIFT_DATA_DIR") {
            self.data_dir = Some(v);
        }
        if let Some(v) = lookup("PDFSIFT_MIN_CHARS").and_then(|v| parsed("PDFSIFT_MIN_CHARS", v)) {
            self.min_chars = Some(v);
        }
        if let Some(v) = lookup("PDFSIFT_DPI").and_then(|v| parsed("PDFSIFT_DPI", v)) {
            self.dpi = Some(v);
        }
        if let Some(v) = lookup("PDFSIFT_TEXT_BACKEND") {
            match TextBackendType::from_str(&v) {
                Some(backend) => self.text_backend = Some(backend),
                None => tracing::warn!("Ignoring PDFSIFT_TEXT_BACKEND={:?}", v),
            }
        }
        if let Some(v) = lookup("PDFSIFT_OCR_BACKEND") {
            match OcrBackendType::from_str(&v) {
                Some(backend) => self.ocr_backend = Some(backend),
                None => tracing::warn!("Ignoring PDFSIFT_OCR_BACKEND={:?}", v),
            }
        }
        if let Some(v) = lookup("PDFSIFT_OCR_LANG") {
            self.ocr_language = Some(v);
        }
        self
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.scratch_dir = settings.data_dir.join(SCRATCH_SUBDIR);
            settings.records_dir = settings.data_dir.join(RECORDS_SUBDIR);
        }
        if let Some(ref scratch_dir) = self.scratch_dir {
            settings.scratch_dir = self.resolve_path(scratch_dir, base_dir);
        }
        if let Some(ref records_dir) = self.records_dir {
            settings.records_dir = self.resolve_path(records_dir, base_dir);
        }
        if let Some(min_chars) = self.min_chars {
            settings.min_chars_threshold = min_chars;
        }
        if let Some(dpi) = self.dpi {
            settings.dpi = dpi;
        }
        if let Some(backend) = self.text_backend {
            settings.text_backend = backend;
        }
        if let Some(backend) = self.ocr_backend {
            settings.ocr_backend = backend;
        }
        if let Some(ref language) = self.ocr_language {
            settings.ocr_language = language.clone();
        }
        if let Some(ref model_dir) = self.ocr_model_dir {
            settings.ocr_model_dir = Some(self.resolve_path(model_dir, base_dir));
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings from defaults, config file and environment.
///
/// An explicitly given config file must exist and parse.
pub async fn load_settings(options: &LoadOptions) -> Result<(Settings, Config), ConfigError> {
    let config = match &options.config_path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    }
    .with_env_overrides();

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.validate()?;

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }
    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::with_data_dir(PathBuf::from("/data"));
        assert_eq!(settings.min_chars_threshold, 20);
        assert_eq!(settings.dpi, 200);
        assert_eq!(settings.text_backend, TextBackendType::Native);
        assert_eq!(settings.ocr_backend, OcrBackendType::Tesseract);
        assert_eq!(settings.scratch_dir, PathBuf::from("/data/scratch"));
        assert_eq!(settings.records_dir, PathBuf::from("/data/records"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_dpi_rejected() {
        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        settings.dpi = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
        settings.dpi = 600;
        assert!(settings.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pdfsift.toml");
        std::fs::write(
            &path,
            "min_chars = 50\ndpi = 150\ntext_backend = \"layout\"\ndata_dir = \"store\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.min_chars, Some(50));
        assert_eq!(config.text_backend, Some(TextBackendType::Layout));

        let mut settings = Settings::with_data_dir(PathBuf::from("/unused"));
        config.apply_to_settings(&mut settings, &config.base_dir().unwrap());
        assert_eq!(settings.data_dir, temp.path().join("store"));
        assert_eq!(settings.scratch_dir, temp.path().join("store").join("scratch"));
        assert_eq!(settings.dpi, 150);
        assert_eq!(settings.min_chars_threshold, 50);
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let temp = TempDir::new().unwrap();
        let yaml = temp.path().join("pdfsift.yaml");
        std::fs::write(&yaml, "ocr_backend: paddleocr\nlang: deu\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.ocr_backend, Some(OcrBackendType::PaddleOcr));
        assert_eq!(config.ocr_language.as_deref(), Some("deu"));

        let json = temp.path().join("pdfsift.json");
        std::fs::write(&json, r#"{"min_chars_threshold": 0}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.min_chars, Some(0));
    }

    #[tokio::test]
    async fn test_bad_config_reports_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pdfsift.toml");
        std::fs::write(&path, "dpi = \"high\"\n").unwrap();
        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));

        let missing = Config::load_from_path(&temp.path().join("nope.toml")).await;
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PDFSIFT_DPI", "300"),
            ("PDFSIFT_MIN_CHARS", "not-a-number"),
            ("PDFSIFT_TEXT_BACKEND", "pdftotext"),
            ("PDFSIFT_OCR_LANG", "fra"),
        ]
        .into_iter()
        .collect();
        let config = Config {
            min_chars: Some(10),
            dpi: Some(120),
            ..Config::default()
        }
        .with_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.dpi, Some(300));
        assert_eq!(config.min_chars, Some(10));
        assert_eq!(config.text_backend, Some(TextBackendType::Layout));
        assert_eq!(config.ocr_language.as_deref(), Some("fra"));
        assert_eq!(config.ocr_backend, None);
    }

    #[test]
    fn test_resolve_path_expands_tilde() {
        let config = Config::default();
        let resolved = config.resolve_path("~/pdfsift", Path::new("/base"));
        assert!(!resolved.starts_with("~"));
        assert_eq!(
            config.resolve_path("rel", Path::new("/base")),
            PathBuf::from("/base/rel")
        );
    }
}
