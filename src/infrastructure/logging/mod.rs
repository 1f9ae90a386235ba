//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Optional rotated JSON file output via tracing-appender

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
