use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Initialize the global logger with the given configuration
    ///
    /// # Returns
    /// * `Result<Self>` - Logger instance with guard to keep file output alive
    ///
    /// # Errors
    /// Returns an error if the level is invalid or a global subscriber is
    /// already installed
    pub fn init(config: &LogConfig) -> Result<Self> {
        let (layers, guard) = build_layers(config)?;

        tracing_subscriber::registry().with(layers).try_init()?;

        tracing::info!(
            level = %config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

/// Build the stdout and file layers described by `config`
fn build_layers(config: &LogConfig) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
    let default_level = parse_log_level(&config.level)?;
    let env_filter = || {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy()
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if let Some(ref log_dir) = config.log_dir {
        let file_appender = match config.rotation {
            RotationPolicy::Daily => rolling::daily(log_dir, "reconciler.log"),
            RotationPolicy::Hourly => rolling::hourly(log_dir, "reconciler.log"),
            RotationPolicy::Never => rolling::never(log_dir, "reconciler.log"),
        };
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

        // File layer - always JSON for structured logging
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter())
                .boxed(),
        );
        guard = Some(file_guard);
    }

    if config.enable_stdout {
        let stdout_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stdout)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter())
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stdout)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter())
                .boxed(),
        };
        layers.push(stdout_layer);
    }

    Ok((layers, guard))
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
