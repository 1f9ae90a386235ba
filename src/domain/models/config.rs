use serde::{Deserialize, Serialize};

use super::console_link::KIBANA_CONSOLE_LINK_NAME;

/// Main configuration structure for the reconciler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Conflict-retry policy for updates
    #[serde(default)]
    pub retry: RetryConfig,

    /// Console link settings
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Retry policy configuration
///
/// Defaults match client-go's `DefaultRetry`: five attempts, 10ms apart,
/// with 10% jitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of update attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on any single delay, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Growth factor applied to the delay after each retry
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Randomization factor in `[0, 1)`
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_initial_backoff_ms() -> u64 {
    10
}

const fn default_max_backoff_ms() -> u64 {
    1_000
}

const fn default_multiplier() -> f64 {
    1.0
}

const fn default_jitter() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

/// Console link settings for the Kibana public URL link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConsoleConfig {
    /// Name of the Kibana console link object
    #[serde(default = "default_kibana_link_name")]
    pub kibana_link_name: String,

    /// Link text shown in the application menu
    #[serde(default = "default_kibana_link_text")]
    pub kibana_link_text: String,

    /// Application menu section the link is placed in
    #[serde(default = "default_application_menu_section")]
    pub application_menu_section: String,

    /// Icon URL (may be a data URL); empty for none
    #[serde(default)]
    pub icon_url: String,
}

fn default_kibana_link_name() -> String {
    KIBANA_CONSOLE_LINK_NAME.to_string()
}

fn default_kibana_link_text() -> String {
    "Logging".to_string()
}

fn default_application_menu_section() -> String {
    "Monitoring".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            kibana_link_name: default_kibana_link_name(),
            kibana_link_text: default_kibana_link_text(),
            application_menu_section: default_application_menu_section(),
            icon_url: String::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
