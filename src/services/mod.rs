//! Reconciliation services.
//!
//! - `convergence_engine`: create-or-update with conflict retry
//! - `capability_probe`: is a kind installed?
//! - `guarded_deletion`: delete only when the kind is installed
//! - `console_links`: console link strategy and the Kibana link helpers

pub mod capability_probe;
pub mod console_links;
pub mod context;
pub mod convergence_engine;
pub mod guarded_deletion;
pub mod retry;

pub use capability_probe::CapabilityProbe;
pub use console_links::{ConsoleLinkReconciler, ConsoleLinkStrategy};
pub use context::ReconcileContext;
pub use convergence_engine::{ConvergeOutcome, ConvergenceEngine};
pub use guarded_deletion::{DeletionOutcome, GuardedDeletion};
pub use retry::RetryPolicy;
