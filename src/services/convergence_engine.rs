//! Convergence engine: create-or-update with optimistic-concurrency retry.
//!
//! ```text
//! get ──NotFound──> create ──> Created
//!  │
//!  └─ok─> equals? ──yes──> Unchanged
//!            │
//!            no
//!            v
//!   ┌─> get (fresh token) ─> apply ─> update ──ok──> Updated
//!   │                                   │
//!   └──────── backoff <──Conflict───────┘   (at most max_attempts updates)
//! ```
//!
//! The retry loop never re-runs `equals`. Every iteration re-reads the
//! object and writes; `apply` must be an overwrite so it can be repeated on
//! each fresh observation.

use std::future::Future;
use std::sync::Arc;

use backoff::backoff::Backoff;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{ReconcileError, ReconcileResult, StoreErrorKind};
use crate::domain::models::Resource;
use crate::domain::ports::{ConvergeStrategy, ObjectStore};
use crate::services::context::ReconcileContext;
use crate::services::retry::RetryPolicy;

/// What a successful `converge` call did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergeOutcome {
    /// The object was absent and has been created.
    Created,
    /// The object already matched; nothing was written.
    Unchanged,
    /// The object was updated after `attempts` update calls.
    Updated { attempts: u32 },
}

/// Converges stored objects of kind `R` toward desired snapshots.
///
/// Holds no per-object state: one engine can serve concurrent calls for any
/// number of identities.
pub struct ConvergenceEngine<R: Resource> {
    store: Arc<dyn ObjectStore<R>>,
    retry: RetryPolicy,
}

impl<R: Resource> ConvergenceEngine<R> {
    pub fn new(store: Arc<dyn ObjectStore<R>>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Make the stored object named `desired.name()` match `desired`.
    ///
    /// # Steps:
    /// 1. Fetch the current object
    /// 2. Absent: create `desired`
    /// 3. Present and `strategy.equals`: done
    /// 4. Otherwise: re-fetch, `strategy.apply`, update, retrying on conflict
    ///
    /// # Errors
    /// - `InvalidObject` if the desired name is empty
    /// - `FetchFailed` for any fetch error other than not-found
    /// - `CreateFailed` for any create error, `AlreadyExists` included
    /// - `UpdateFailed` for any non-conflict update error
    /// - `ConflictRetryExhausted` when every attempt lost the race
    /// - `Cancelled` when `ctx` fires first
    #[instrument(
        skip(self, ctx, desired, strategy),
        fields(kind = R::KIND, name = %desired.name()),
        err
    )]
    pub async fn converge<S>(
        &self,
        ctx: &ReconcileContext,
        desired: &R,
        strategy: &S,
    ) -> ReconcileResult<ConvergeOutcome>
    where
        S: ConvergeStrategy<R> + ?Sized,
    {
        let name = desired.name();
        if name.is_empty() {
            return Err(ReconcileError::InvalidObject {
                kind: R::KIND,
                reason: "name must not be empty".to_string(),
            });
        }

        let current = match self.guarded(ctx, name, self.store.get(name)).await? {
            Ok(current) => current,
            Err(source) if source.kind == StoreErrorKind::NotFound => {
                return match self.guarded(ctx, name, self.store.create(desired)).await? {
                    Ok(()) => {
                        info!("created");
                        Ok(ConvergeOutcome::Created)
                    }
                    Err(source) => Err(ReconcileError::CreateFailed {
                        kind: R::KIND,
                        name: name.to_string(),
                        source,
                    }),
                };
            }
            Err(source) => {
                return Err(ReconcileError::FetchFailed {
                    kind: R::KIND,
                    name: name.to_string(),
                    source,
                })
            }
        };

        if strategy.equals(&current, desired) {
            debug!("already up to date");
            return Ok(ConvergeOutcome::Unchanged);
        }

        let attempts = self.update_with_retry(ctx, desired, strategy).await?;
        info!(attempts, "updated");
        Ok(ConvergeOutcome::Updated { attempts })
    }

    /// Re-fetch, apply and update until the store accepts the write.
    ///
    /// Returns the number of update calls made.
    async fn update_with_retry<S>(
        &self,
        ctx: &ReconcileContext,
        desired: &R,
        strategy: &S,
    ) -> ReconcileResult<u32>
    where
        S: ConvergeStrategy<R> + ?Sized,
    {
        let name = desired.name();
        let max_attempts = self.retry.max_attempts();
        let mut schedule = self.retry.schedule();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut current = self
                .guarded(ctx, name, self.store.get(name))
                .await?
                .map_err(|source| ReconcileError::FetchFailed {
                    kind: R::KIND,
                    name: name.to_string(),
                    source,
                })?;

            // The store validates the token it handed out; the strategy
            // must not move it or the identity.
            let meta = current.metadata().clone();
            strategy.apply(&mut current, desired);
            current.metadata_mut().name = meta.name;
            current.metadata_mut().resource_version = meta.resource_version;

            let source = match self.guarded(ctx, name, self.store.update(&current)).await? {
                Ok(()) => return Ok(attempt),
                Err(source) if source.kind == StoreErrorKind::Conflict => source,
                Err(source) => {
                    return Err(ReconcileError::UpdateFailed {
                        kind: R::KIND,
                        name: name.to_string(),
                        source,
                    })
                }
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %source, "conflict retry budget exhausted");
                return Err(ReconcileError::ConflictRetryExhausted {
                    kind: R::KIND,
                    name: name.to_string(),
                    attempts: attempt,
                    source,
                });
            }

            let delay = schedule
                .next_backoff()
                .unwrap_or_else(|| self.retry.max_backoff());
            debug!(attempt, max_attempts, ?delay, error = %source, "update conflicted, retrying");

            if !ctx.sleep(delay).await {
                return Err(cancelled::<R>(name));
            }
        }
    }

    /// Run one store call under `ctx`, mapping cancellation to an error.
    async fn guarded<T>(
        &self,
        ctx: &ReconcileContext,
        name: &str,
        call: impl Future<Output = T>,
    ) -> ReconcileResult<T> {
        ctx.run(call).await.ok_or_else(|| cancelled::<R>(name))
    }
}

pub(crate) fn cancelled<R: Resource>(name: &str) -> ReconcileError {
    ReconcileError::Cancelled {
        kind: R::KIND,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryObjectStore, StoreOp};
    use crate::domain::errors::StoreError;
    use crate::domain::models::ConsoleLink;
    use crate::domain::ports::FnStrategy;

    fn link(text: &str) -> ConsoleLink {
        ConsoleLink::new("x", "https://example.com", text, "", "Monitoring")
    }

    fn text_strategy() -> impl ConvergeStrategy<ConsoleLink> {
        FnStrategy::new(
            |current: &ConsoleLink, desired: &ConsoleLink| {
                current.spec.link.text == desired.spec.link.text
            },
            |current: &mut ConsoleLink, desired: &ConsoleLink| {
                current.spec = desired.spec.clone();
            },
        )
    }

    fn engine(
        store: &Arc<InMemoryObjectStore<ConsoleLink>>,
        attempts: u32,
    ) -> ConvergenceEngine<ConsoleLink> {
        ConvergenceEngine::<ConsoleLink>::new(store.clone(), RetryPolicy::immediate(attempts))
    }

    #[tokio::test]
    async fn test_creates_when_absent() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        let engine = engine(&store, 3);

        let outcome = engine
            .converge(&ReconcileContext::new(), &link("a"), &text_strategy())
            .await
            .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Created);
        assert_eq!(store.calls(StoreOp::Create), 1);
        assert_eq!(store.calls(StoreOp::Update), 0);
    }

    #[tokio::test]
    async fn test_create_failure_carries_identity() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        store
            .fail_next(StoreOp::Create, StoreError::already_exists("raced"))
            .await;
        let engine = engine(&store, 3);

        let err = engine
            .converge(&ReconcileContext::new(), &link("a"), &text_strategy())
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::CreateFailed { ref name, .. } if name == "x"));
        assert_eq!(err.store_error().map(|e| e.kind), Some(StoreErrorKind::AlreadyExists));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_retried() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        store.fail_next(StoreOp::Get, StoreError::other("timeout")).await;
        let engine = engine(&store, 3);

        let err = engine
            .converge(&ReconcileContext::new(), &link("a"), &text_strategy())
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::FetchFailed { .. }));
        assert_eq!(store.calls(StoreOp::Get), 1);
        assert_eq!(store.calls(StoreOp::Create), 0);
    }

    #[tokio::test]
    async fn test_unchanged_when_equal() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        store.insert(link("a")).await;
        let engine = engine(&store, 3);

        let outcome = engine
            .converge(&ReconcileContext::new(), &link("a"), &text_strategy())
            .await
            .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Unchanged);
        assert_eq!(store.calls(StoreOp::Update), 0);
    }

    #[tokio::test]
    async fn test_update_failure_is_not_retried() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        store.insert(link("a")).await;
        store
            .fail_next(StoreOp::Update, StoreError::other("forbidden"))
            .await;
        let engine = engine(&store, 5);

        let err = engine
            .converge(&ReconcileContext::new(), &link("b"), &text_strategy())
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::UpdateFailed { .. }));
        assert_eq!(store.calls(StoreOp::Update), 1);
    }

    #[tokio::test]
    async fn test_conflicts_then_success() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        store.insert(link("a")).await;
        for _ in 0..2 {
            store
                .fail_next(StoreOp::Update, StoreError::conflict("stale"))
                .await;
        }
        let engine = engine(&store, 5);

        let outcome = engine
            .converge(&ReconcileContext::new(), &link("b"), &text_strategy())
            .await
            .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Updated { attempts: 3 });
        // One initial read plus one per attempt.
        assert_eq!(store.calls(StoreOp::Get), 4);
        assert_eq!(store.calls(StoreOp::Update), 3);
        assert_eq!(store.snapshot("x").await.unwrap().spec.link.text, "b");
    }

    #[tokio::test]
    async fn test_strategy_cannot_move_version_token() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        store.insert(link("a")).await;
        let engine = engine(&store, 1);
        let clobbering = FnStrategy::new(
            |_: &ConsoleLink, _: &ConsoleLink| false,
            |current: &mut ConsoleLink, desired: &ConsoleLink| *current = desired.clone(),
        );

        // `desired` has no token; copying it wholesale must not wipe the
        // fetched one or the update would be rejected as stale.
        let outcome = engine
            .converge(&ReconcileContext::new(), &link("b"), &clobbering)
            .await
            .unwrap();

        assert_eq!(outcome, ConvergeOutcome::Updated { attempts: 1 });
    }

    #[tokio::test]
    async fn test_cancelled_before_first_call() {
        let store = Arc::new(InMemoryObjectStore::<ConsoleLink>::new());
        let engine = engine(&store, 3);
        let ctx = ReconcileContext::new();
        ctx.token().cancel();

        let err = engine
            .converge(&ctx, &link("a"), &text_strategy())
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(store.calls(StoreOp::Get), 0);
    }
}
