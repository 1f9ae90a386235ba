use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error("Invalid backoff: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})")]
    InvalidBackoff(u64, u64),

    #[error("Invalid multiplier: {0}. Must be at least 1.0")]
    InvalidMultiplier(f64),

    #[error("Invalid jitter: {0}. Must be in [0, 1)")]
    InvalidJitter(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the working directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .reconciler/config.yaml
    /// 3. .reconciler/local.yaml (optional overrides)
    /// 4. Environment variables (RECONCILER_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`], rooted at `root` instead of the
    /// working directory
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(".reconciler");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("RECONCILER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let retry = &config.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(retry.max_attempts));
        }

        if retry.initial_backoff_ms > retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                retry.initial_backoff_ms,
                retry.max_backoff_ms,
            ));
        }

        if retry.multiplier.is_nan() || retry.multiplier < 1.0 {
            return Err(ConfigError::InvalidMultiplier(retry.multiplier));
        }

        if !(0.0..1.0).contains(&retry.jitter) {
            return Err(ConfigError::InvalidJitter(retry.jitter));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.console.kibana_link_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "console.kibana_link_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
