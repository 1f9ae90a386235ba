//! In-memory adapters.
//!
//! A reference implementation of the store ports, used by the test suite
//! and by callers that need a local, versioned store.

pub mod object_store;
pub mod schema_registry;

pub use object_store::{InMemoryObjectStore, StoreOp};
pub use schema_registry::InMemorySchemaRegistry;
