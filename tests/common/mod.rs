//! Common test utilities for integration tests
//!
//! Provides a minimal resource kind, its strategy, and store fixtures used
//! across multiple integration test files.

use std::sync::Arc;

use reconciler::adapters::memory::{InMemoryObjectStore, InMemorySchemaRegistry};
use reconciler::{ConvergeStrategy, ConvergenceEngine, ObjectMeta, Resource, RetryPolicy};

/// Descriptor under which `Note` is registered.
#[allow(dead_code)]
pub const NOTE_DESCRIPTOR: &str = "notes.example.com";

/// A resource with a single text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub metadata: ObjectMeta,
    pub text: String,
}

impl Resource for Note {
    const KIND: &'static str = "Note";
    const DESCRIPTOR: &'static str = NOTE_DESCRIPTOR;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Build a desired note.
#[allow(dead_code)]
pub fn note(name: &str, text: &str) -> Note {
    Note {
        metadata: ObjectMeta::named(name),
        text: text.to_string(),
    }
}

/// Compares and copies `text`.
pub struct NoteStrategy;

impl ConvergeStrategy<Note> for NoteStrategy {
    fn equals(&self, current: &Note, desired: &Note) -> bool {
        current.text == desired.text
    }

    fn apply(&self, current: &mut Note, desired: &Note) {
        current.text.clone_from(&desired.text);
    }
}

/// Fresh store plus an engine over it with an immediate retry policy.
#[allow(dead_code)]
pub fn note_engine(attempts: u32) -> (Arc<InMemoryObjectStore<Note>>, ConvergenceEngine<Note>) {
    let store = Arc::new(InMemoryObjectStore::<Note>::new());
    let engine = ConvergenceEngine::<Note>::new(store.clone(), RetryPolicy::immediate(attempts));
    (store, engine)
}

/// Registry with the `Note` descriptor installed, or empty.
#[allow(dead_code)]
pub fn note_registry(installed: bool) -> Arc<InMemorySchemaRegistry> {
    Arc::new(if installed {
        InMemorySchemaRegistry::with_descriptors([NOTE_DESCRIPTOR])
    } else {
        InMemorySchemaRegistry::new()
    })
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
