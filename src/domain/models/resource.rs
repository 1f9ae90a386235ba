//! Object identity and version metadata shared by every stored resource.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata common to all stored objects.
///
/// `name` is the identity key. `resource_version` is the store's opaque
/// version token: adapters set it on every read and compare it on every
/// update, the reconciler only carries it around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A kind of object that can be reconciled against a store.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Kind name used in logs and errors.
    const KIND: &'static str;

    /// Schema registry descriptor whose presence means the kind is installed.
    const DESCRIPTOR: &'static str;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn resource_version(&self) -> Option<&str> {
        self.metadata().resource_version.as_deref()
    }
}
