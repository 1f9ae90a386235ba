//! Reconciler - converge declarative objects into a versioned store
//!
//! Given a desired object and a store that rejects writes carrying a stale
//! version token, the reconciler creates the object if it is missing,
//! leaves it alone if it already matches, and otherwise re-reads and
//! rewrites it until the store accepts the write or the retry budget runs
//! out. Deletion is gated on the object's kind being installed in the
//! store's schema registry.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): resource models, errors, port traits
//! - **Service Layer** (`services`): convergence engine, capability probe,
//!   guarded deletion, console link reconciliation
//! - **Adapters** (`adapters`): in-memory store and schema registry
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reconciler::adapters::memory::{InMemoryObjectStore, InMemorySchemaRegistry};
//! use reconciler::domain::models::{Config, ConsoleLink};
//! use reconciler::services::{ConsoleLinkReconciler, ReconcileContext};
//!
//! # async fn example() -> reconciler::domain::ReconcileResult<()> {
//! let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
//! let registry = Arc::new(InMemorySchemaRegistry::new());
//! let reconciler = ConsoleLinkReconciler::from_config(store, registry, &Config::default());
//!
//! let ctx = ReconcileContext::new();
//! reconciler
//!     .reconcile_kibana_link(&ctx, "https://kibana.example.com")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ReconcileError, ReconcileResult, StoreError, StoreErrorKind};
pub use domain::models::{Config, ConsoleLink, ObjectMeta, Resource, RetryConfig};
pub use domain::ports::{ConvergeStrategy, FnStrategy, ObjectStore, SchemaRegistry};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CapabilityProbe, ConsoleLinkReconciler, ConvergeOutcome, ConvergenceEngine, DeletionOutcome,
    GuardedDeletion, ReconcileContext, RetryPolicy,
};
