//! In-memory object store with optimistic concurrency.
//!
//! Behaves like a versioned API server for a single resource kind: every
//! write assigns a fresh `resource_version`, and an update carrying any
//! other token is rejected with `Conflict`. Failures and concurrent writers
//! can be scripted for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::Resource;
use crate::domain::ports::ObjectStore;

/// Store operation, used to script faults and read call counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct CallCounts {
    get: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

impl CallCounts {
    fn counter(&self, op: StoreOp) -> &AtomicUsize {
        match op {
            StoreOp::Get => &self.get,
            StoreOp::Create => &self.create,
            StoreOp::Update => &self.update,
            StoreOp::Delete => &self.delete,
        }
    }
}

type Writer<R> = Arc<dyn Fn(&mut R) + Send + Sync>;

/// Versioned in-memory store for one resource kind.
pub struct InMemoryObjectStore<R: Resource> {
    objects: RwLock<HashMap<String, R>>,
    next_version: AtomicU64,
    faults: Mutex<HashMap<StoreOp, VecDeque<StoreError>>>,
    concurrent_writer: Mutex<Option<(u32, Writer<R>)>>,
    calls: CallCounts,
}

impl<R: Resource> InMemoryObjectStore<R> {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            next_version: AtomicU64::new(1),
            faults: Mutex::new(HashMap::new()),
            concurrent_writer: Mutex::new(None),
            calls: CallCounts::default(),
        }
    }

    /// Seed an object directly, bypassing counters and faults.
    ///
    /// Overwrites any existing object of the same name and returns the
    /// stored copy with its assigned version.
    pub async fn insert(&self, mut object: R) -> R {
        object.metadata_mut().resource_version = Some(self.next_version());
        let mut objects = self.objects.write().await;
        objects.insert(object.name().to_string(), object.clone());
        object
    }

    /// Current stored copy of an object.
    pub async fn snapshot(&self, name: &str) -> Option<R> {
        let objects = self.objects.read().await;
        objects.get(name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Fail the next call of `op` with `error`. Queued faults fire in order.
    pub async fn fail_next(&self, op: StoreOp, error: StoreError) {
        let mut faults = self.faults.lock().await;
        faults.entry(op).or_default().push_back(error);
    }

    /// Simulate another writer: before each of the next `times` updates,
    /// `write` is applied to the stored object and its version is bumped,
    /// so the incoming update is stale.
    pub async fn race_next_updates<F>(&self, times: u32, write: F)
    where
        F: Fn(&mut R) + Send + Sync + 'static,
    {
        let mut slot = self.concurrent_writer.lock().await;
        *slot = Some((times, Arc::new(write)));
    }

    /// Number of calls made for `op`, including ones that failed.
    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls.counter(op).load(Ordering::SeqCst)
    }

    fn next_version(&self) -> String {
        self.next_version.fetch_add(1, Ordering::SeqCst).to_string()
    }

    async fn record(&self, op: StoreOp) -> StoreResult<()> {
        self.calls.counter(op).fetch_add(1, Ordering::SeqCst);
        let mut faults = self.faults.lock().await;
        match faults.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn run_concurrent_writer(&self, name: &str) {
        let writer = {
            let mut slot = self.concurrent_writer.lock().await;
            match slot.as_mut() {
                Some((remaining, writer)) if *remaining > 0 => {
                    *remaining -= 1;
                    Some(Arc::clone(writer))
                }
                _ => None,
            }
        };

        if let Some(writer) = writer {
            let mut objects = self.objects.write().await;
            if let Some(stored) = objects.get_mut(name) {
                writer(stored);
                stored.metadata_mut().resource_version = Some(self.next_version());
            }
        }
    }
}

impl<R: Resource> Default for InMemoryObjectStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> ObjectStore<R> for InMemoryObjectStore<R> {
    async fn get(&self, name: &str) -> StoreResult<R> {
        self.record(StoreOp::Get).await?;
        let objects = self.objects.read().await;
        objects
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("{} {name} not found", R::KIND)))
    }

    async fn create(&self, object: &R) -> StoreResult<()> {
        self.record(StoreOp::Create).await?;
        let mut objects = self.objects.write().await;
        if objects.contains_key(object.name()) {
            return Err(StoreError::already_exists(format!(
                "{} {} already exists",
                R::KIND,
                object.name()
            )));
        }

        let mut created = object.clone();
        created.metadata_mut().resource_version = Some(self.next_version());
        objects.insert(created.name().to_string(), created);
        Ok(())
    }

    async fn update(&self, object: &R) -> StoreResult<()> {
        self.record(StoreOp::Update).await?;
        self.run_concurrent_writer(object.name()).await;

        let mut objects = self.objects.write().await;
        let stored = objects.get_mut(object.name()).ok_or_else(|| {
            StoreError::not_found(format!("{} {} not found", R::KIND, object.name()))
        })?;

        if stored.resource_version() != object.resource_version() {
            return Err(StoreError::conflict(format!(
                "{} {} has been modified: resourceVersion {:?} is stale, latest is {:?}",
                R::KIND,
                object.name(),
                object.resource_version(),
                stored.resource_version(),
            )));
        }

        let mut updated = object.clone();
        updated.metadata_mut().resource_version = Some(self.next_version());
        *stored = updated;
        Ok(())
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        self.record(StoreOp::Delete).await?;
        let mut objects = self.objects.write().await;
        objects
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("{} {name} not found", R::KIND)))
    }
}
