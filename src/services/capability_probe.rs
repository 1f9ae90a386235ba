//! Capability probe: is a resource kind installed in the schema registry?

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::errors::StoreErrorKind;
use crate::domain::models::Resource;
use crate::domain::ports::SchemaRegistry;
use crate::services::context::ReconcileContext;

/// Reports whether a kind descriptor is present. Never fails.
///
/// Every lookup error, not-found or otherwise, reads as "disabled". A flaky
/// registry therefore looks like an uninstalled kind; such errors are logged
/// at `warn` so they can be told apart from a genuine absence.
#[derive(Clone)]
pub struct CapabilityProbe {
    registry: Arc<dyn SchemaRegistry>,
}

impl CapabilityProbe {
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Single registry read, no retry.
    #[instrument(skip(self, ctx))]
    pub async fn is_enabled(&self, ctx: &ReconcileContext, descriptor: &str) -> bool {
        match ctx.run(self.registry.get_descriptor(descriptor)).await {
            Some(Ok(())) => true,
            Some(Err(err)) if err.kind == StoreErrorKind::NotFound => {
                debug!("descriptor not installed");
                false
            }
            Some(Err(err)) => {
                warn!(error = %err, "descriptor lookup failed, treating kind as disabled");
                false
            }
            None => {
                debug!("descriptor lookup cancelled");
                false
            }
        }
    }

    /// Probe the descriptor of kind `R`.
    pub async fn is_enabled_for<R: Resource>(&self, ctx: &ReconcileContext) -> bool {
        self.is_enabled(ctx, R::DESCRIPTOR).await
    }
}
