//! In-memory schema registry.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::SchemaRegistry;

/// Set of installed kind descriptors, with an optional sticky failure.
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
    descriptors: RwLock<HashSet<String>>,
    failure: Mutex<Option<StoreError>>,
    lookups: AtomicUsize,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptors<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            descriptors: RwLock::new(descriptors.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub async fn install(&self, descriptor: impl Into<String>) {
        self.descriptors.write().await.insert(descriptor.into());
    }

    pub async fn uninstall(&self, descriptor: &str) {
        self.descriptors.write().await.remove(descriptor);
    }

    /// Make every lookup fail with `error` until cleared with `None`.
    pub async fn set_failure(&self, error: Option<StoreError>) {
        *self.failure.lock().await = error;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaRegistry for InMemorySchemaRegistry {
    async fn get_descriptor(&self, name: &str) -> StoreResult<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failure.lock().await.clone() {
            return Err(error);
        }

        if self.descriptors.read().await.contains(name) {
            Ok(())
        } else {
            Err(StoreError::not_found(format!(
                "customresourcedefinition {name} not found"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StoreErrorKind;

    #[tokio::test]
    async fn test_install_and_uninstall() {
        let registry = InMemorySchemaRegistry::new();
        assert_eq!(
            registry.get_descriptor("widgets.example.com").await.unwrap_err().kind,
            StoreErrorKind::NotFound
        );

        registry.install("widgets.example.com").await;
        assert!(registry.get_descriptor("widgets.example.com").await.is_ok());

        registry.uninstall("widgets.example.com").await;
        assert!(registry.get_descriptor("widgets.example.com").await.is_err());
        assert_eq!(registry.lookups(), 3);
    }

    #[tokio::test]
    async fn test_failure_overrides_presence() {
        let registry = InMemorySchemaRegistry::with_descriptors(["widgets.example.com"]);
        registry.set_failure(Some(StoreError::other("etcd unavailable"))).await;

        let err = registry.get_descriptor("widgets.example.com").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Other);

        registry.set_failure(None).await;
        assert!(registry.get_descriptor("widgets.example.com").await.is_ok());
    }
}
