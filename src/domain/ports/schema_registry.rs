//! Schema registry port.

use async_trait::async_trait;

use crate::domain::errors::StoreResult;

/// Read access to the store's registry of installed resource kinds.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Look up a kind descriptor by name. `Ok(())` means it is installed.
    async fn get_descriptor(&self, name: &str) -> StoreResult<()>;
}
