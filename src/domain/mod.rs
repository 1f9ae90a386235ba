//! Domain layer for the reconciler
//!
//! This module contains the resource models, error taxonomy and the port
//! traits that store adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{ReconcileError, ReconcileResult, StoreError, StoreErrorKind, StoreResult};
