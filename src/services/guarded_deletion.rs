//! Deletion gated on the resource kind being installed.
//!
//! ```text
//! probe ──disabled──> Skipped
//!   │
//! enabled ──> delete ──ok──────> Deleted
//!               ├──NotFound──> AlreadyAbsent
//!               └──other─────> DeleteFailed
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::domain::errors::{ReconcileError, ReconcileResult, StoreErrorKind};
use crate::domain::models::Resource;
use crate::domain::ports::ObjectStore;
use crate::services::capability_probe::CapabilityProbe;
use crate::services::context::ReconcileContext;
use crate::services::convergence_engine::cancelled;

/// What a successful `delete_if_enabled` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The kind is not installed; no delete was issued.
    Skipped,
    Deleted,
    /// The kind is installed but the object was already gone.
    AlreadyAbsent,
}

/// Deletes objects of kind `R`, but only when the store knows the kind.
pub struct GuardedDeletion<R: Resource> {
    store: Arc<dyn ObjectStore<R>>,
    probe: CapabilityProbe,
}

impl<R: Resource> GuardedDeletion<R> {
    pub fn new(store: Arc<dyn ObjectStore<R>>, probe: CapabilityProbe) -> Self {
        Self { store, probe }
    }

    #[instrument(skip(self, ctx), fields(kind = R::KIND), err)]
    pub async fn delete_if_enabled(
        &self,
        ctx: &ReconcileContext,
        name: &str,
    ) -> ReconcileResult<DeletionOutcome> {
        if name.is_empty() {
            return Err(ReconcileError::InvalidObject {
                kind: R::KIND,
                reason: "name must not be empty".to_string(),
            });
        }

        if !self.probe.is_enabled_for::<R>(ctx).await {
            // A probe cut short by cancellation also reads as disabled.
            if ctx.is_cancelled() {
                return Err(cancelled::<R>(name));
            }
            info!(descriptor = R::DESCRIPTOR, "kind not installed, skipping deletion");
            return Ok(DeletionOutcome::Skipped);
        }

        let result = ctx
            .run(self.store.delete(name))
            .await
            .ok_or_else(|| cancelled::<R>(name))?;

        match result {
            Ok(()) => {
                info!("deleted");
                Ok(DeletionOutcome::Deleted)
            }
            Err(source) if source.kind == StoreErrorKind::NotFound => {
                debug!("already absent");
                Ok(DeletionOutcome::AlreadyAbsent)
            }
            Err(source) => Err(ReconcileError::DeleteFailed {
                kind: R::KIND,
                name: name.to_string(),
                source,
            }),
        }
    }
}
