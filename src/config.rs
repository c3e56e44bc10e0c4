//! Configuration management for storyreplies using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::extraction::DEFAULT_MAX_TEXT_CHARS;
use crate::quality::DEFAULT_LOW_CONFIDENCE_THRESHOLD;
use crate::statistics::{clamp_top_answers_limit, DEFAULT_TOP_ANSWERS_LIMIT};

/// Default number of stories processed at once in batch mode.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Environment variable overriding the batch concurrency.
pub const BATCH_CONCURRENCY_ENV: &str = "STORYREPLIES_BATCH_CONCURRENCY";

/// Effective application settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Length of the ranked answer list, at most 10.
    pub top_answers_limit: usize,
    /// OCR confidence below which extraction quality is penalized.
    pub low_confidence_threshold: f64,
    /// OCR texts longer than this are rejected.
    pub max_text_chars: usize,
    /// Stories processed concurrently by `batch`.
    pub batch_concurrency: usize,
    /// Config file the settings came from, if any.
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_answers_limit: DEFAULT_TOP_ANSWERS_LIMIT,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            source_path: None,
        }
    }
}

impl Settings {
    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        let from_env = std::env::var(BATCH_CONCURRENCY_ENV).ok();
        if let Some(concurrency) = parse_concurrency(from_env.as_deref()) {
            self.batch_concurrency = concurrency;
        }
        self
    }
}

/// Parse a positive concurrency value.
fn parse_concurrency(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Number of entries in the top-answers list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_answers_limit: Option<usize>,
    /// OCR confidence threshold for the quality report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_confidence_threshold: Option<f64>,
    /// Maximum accepted OCR text length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_text_chars: Option<usize>,
    /// Batch concurrency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_concurrency: Option<usize>,

    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers storyreplies config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("storyreplies").await {
            Ok(pref_config) => {
                let top_answers_limit: Option<usize> =
                    pref_config.get("top_answers_limit").ok();
                let low_confidence_threshold: Option<f64> =
                    pref_config.get("low_confidence_threshold").ok();
                let max_text_chars: Option<usize> = pref_config.get("max_text_chars").ok();
                let batch_concurrency: Option<usize> =
                    pref_config.get("batch_concurrency").ok();

                let source_path = pref_config.source_path().cloned();

                Config {
                    top_answers_limit,
                    low_confidence_threshold,
                    max_text_chars,
                    batch_concurrency,
                    source_path,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config: Config = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(limit) = self.top_answers_limit {
            settings.top_answers_limit = clamp_top_answers_limit(limit);
        }
        if let Some(threshold) = self.low_confidence_threshold {
            settings.low_confidence_threshold = threshold.clamp(0.0, 1.0);
        }
        if let Some(max) = self.max_text_chars {
            settings.max_text_chars = max;
        }
        if let Some(concurrency) = self.batch_concurrency.filter(|&n| n > 0) {
            settings.batch_concurrency = concurrency;
        }
        if self.source_path.is_some() {
            settings.source_path = self.source_path.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery). `~` is expanded.
    pub config_path: Option<String>,
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load settings with explicit options.
///
/// An explicit config path that cannot be read is an error; a missing
/// auto-discovered config falls back to defaults.
pub async fn load_settings_with_options(options: LoadOptions) -> Result<Settings, String> {
    let config = match &options.config_path {
        Some(path) => Config::load_from_path(&expand_path(path)).await?,
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);

    Ok(settings.with_env_overrides())
}
