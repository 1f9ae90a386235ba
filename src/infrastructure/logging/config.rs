use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::models::LoggingConfig;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stdout)
    pub log_dir: Option<PathBuf>,

    /// Enable stdout logging
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let format = if config.format.eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };

        Self {
            level: config.level.clone(),
            format,
            log_dir: config.log_dir.as_ref().map(PathBuf::from),
            ..Self::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Json
}

const fn default_true() -> bool {
    true
}
