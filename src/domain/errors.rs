//! Domain errors for reconciliation.
//!
//! Two layers of errors live here:
//!
//! - [`StoreError`]: what a store adapter reports, classified by a tagged
//!   [`StoreErrorKind`] so callers can branch on `NotFound` / `Conflict`
//!   without string matching.
//! - [`ReconcileError`]: what the convergence engine and guarded deletion
//!   surface to their callers. Every variant carries the resource kind and
//!   the object's name.

use std::fmt;

use thiserror::Error;

/// Classification of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// The named object (or descriptor) does not exist.
    NotFound,
    /// A create collided with an existing object of the same name.
    AlreadyExists,
    /// An update carried a stale version token.
    Conflict,
    /// Anything else: transport failures, validation, permissions.
    Other,
}

impl StoreErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::Conflict => "conflict",
            Self::Other => "store error",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::AlreadyExists, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, message)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Invalid {kind}: {reason}")]
    InvalidObject { kind: &'static str, reason: String },

    #[error("Failed to get {kind} {name}")]
    FetchFailed {
        kind: &'static str,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create {kind} {name}")]
    CreateFailed {
        kind: &'static str,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to update {kind} {name}")]
    UpdateFailed {
        kind: &'static str,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to delete {kind} {name}")]
    DeleteFailed {
        kind: &'static str,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Gave up updating {kind} {name} after {attempts} conflicting attempts")]
    ConflictRetryExhausted {
        kind: &'static str,
        name: String,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("Reconciliation of {kind} {name} was cancelled")]
    Cancelled { kind: &'static str, name: String },
}

impl ReconcileError {
    /// Name of the object the failure concerns, if one was known.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::InvalidObject { .. } => None,
            Self::FetchFailed { name, .. }
            | Self::CreateFailed { name, .. }
            | Self::UpdateFailed { name, .. }
            | Self::DeleteFailed { name, .. }
            | Self::ConflictRetryExhausted { name, .. }
            | Self::Cancelled { name, .. } => Some(name),
        }
    }

    /// The underlying store error, if the failure came from the store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::FetchFailed { source, .. }
            | Self::CreateFailed { source, .. }
            | Self::UpdateFailed { source, .. }
            | Self::DeleteFailed { source, .. }
            | Self::ConflictRetryExhausted { source, .. } => Some(source),
            Self::InvalidObject { .. } | Self::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
