//! Port trait definitions (Hexagonal Architecture)
//!
//! The reconciler depends on two external collaborators, both expressed as
//! async traits that adapters implement:
//! - ObjectStore: typed get/create/update/delete keyed by name
//! - SchemaRegistry: lookup of installed resource-kind descriptors
//!
//! ConvergeStrategy is the per-kind plug-in that decides equality and
//! applies the desired state.

pub mod converge_strategy;
pub mod object_store;
pub mod schema_registry;

pub use converge_strategy::{ConvergeStrategy, FnStrategy};
pub use object_store::ObjectStore;
pub use schema_registry::SchemaRegistry;
