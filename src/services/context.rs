//! Per-call cancellation and deadline handling.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation scope for one reconciliation call.
///
/// Every store round-trip and every backoff sleep is raced against the
/// token and the optional deadline. Whichever fires first drops the
/// in-flight future.
#[derive(Debug, Clone, Default)]
pub struct ReconcileContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ReconcileContext {
    /// A context that is never cancelled unless its token is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the context to an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Expire `timeout` from now. A timeout too large to represent as an
    /// instant leaves the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the token fired or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` to completion unless the context is cancelled first.
    ///
    /// Returns `None` on cancellation. An already-cancelled context never
    /// polls `fut`.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            () = expiry(self.deadline) => None,
            output = fut => Some(output),
        }
    }

    /// Sleep for `duration`; returns `false` if cancelled while sleeping.
    pub async fn sleep(&self, duration: Duration) -> bool {
        self.run(sleep(duration)).await.is_some()
    }
}

async fn expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let ctx = ReconcileContext::new();
        assert_eq!(ctx.run(async { 7 }).await, Some(7));
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_skips_future_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = ReconcileContext::with_token(token);

        assert!(ctx.is_cancelled());
        assert_eq!(ctx.run(async { 7 }).await, None);
    }

    #[tokio::test]
    async fn test_sleep_interrupted_by_token() {
        let token = CancellationToken::new();
        let ctx = ReconcileContext::with_token(token.clone());

        let canceller = tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let started = std::time::Instant::now();
        assert!(!ctx.sleep(Duration::from_secs(30)).await);
        assert!(started.elapsed() < Duration::from_secs(5));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_means_no_deadline() {
        let ctx = ReconcileContext::new().with_timeout(Duration::MAX);

        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_deadline_cancels() {
        let ctx = ReconcileContext::new().with_timeout(Duration::from_millis(20));

        assert!(!ctx.sleep(Duration::from_secs(30)).await);
        assert!(ctx.is_cancelled());
        assert!(ctx.deadline().is_some());
    }
}
