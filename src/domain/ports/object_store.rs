//! Object store port.

use async_trait::async_trait;

use crate::domain::errors::StoreResult;
use crate::domain::models::Resource;

/// Typed, optimistically-concurrent store client keyed by object name.
///
/// Adapters classify failures with [`StoreErrorKind`](crate::domain::errors::StoreErrorKind):
///
/// - `get` and `delete` report a missing object as `NotFound`.
/// - `create` reports a name collision as `AlreadyExists`.
/// - `update` reports a stale `resource_version` as `Conflict`.
#[async_trait]
pub trait ObjectStore<R: Resource>: Send + Sync {
    /// Fetch the live object, with its current version token.
    async fn get(&self, name: &str) -> StoreResult<R>;

    /// Create a new object.
    async fn create(&self, object: &R) -> StoreResult<()>;

    /// Replace an existing object; the carried version token must be current.
    async fn update(&self, object: &R) -> StoreResult<()>;

    /// Delete an object by name.
    async fn delete(&self, name: &str) -> StoreResult<()>;
}
