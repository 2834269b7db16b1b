//! Engine configuration
//!
//! Loaded from a JSON file; every key is optional.
//!
//! ```json
//! { "log_threshold": "INFO", "regex_size_limit": 1048576, "collect_metrics": true }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum severity written by the engine logger (default WARN)
    #[serde(default = "default_log_threshold")]
    pub log_threshold: Severity,

    /// Compiled size limit for `like` and regex patterns, in bytes (default 1 MiB)
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,

    /// Whether executors created from this config record counters (default false)
    #[serde(default)]
    pub collect_metrics: bool,
}

fn default_log_threshold() -> Severity {
    Severity::Warn
}

fn default_regex_size_limit() -> usize {
    1 << 20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_threshold: default_log_threshold(),
            regex_size_limit: default_regex_size_limit(),
            collect_metrics: false,
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json_str(&content)?;

        let path_display = path.display().to_string();
        log_event(
            &config.logger(),
            Event::ConfigLoaded,
            &[
                ("path", path_display.as_str()),
                ("log_threshold", config.log_threshold.as_str()),
            ],
        );

        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.regex_size_limit == 0 {
            return Err(ConfigError::Invalid("regex_size_limit must be > 0".into()));
        }
        Ok(())
    }

    pub fn with_log_threshold(mut self, threshold: Severity) -> Self {
        self.log_threshold = threshold;
        self
    }

    pub fn logger(&self) -> Logger {
        Logger::new(self.log_threshold)
    }
}
