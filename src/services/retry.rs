//! Conflict-retry policy.

use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::domain::models::RetryConfig;

/// Retry budget and backoff schedule for optimistic-concurrency conflicts.
///
/// `max_attempts` counts update attempts, the first one included. Delays
/// grow by `multiplier` after each retry, are capped at `max_backoff`, and
/// are randomized by `jitter`. Total sleep per call is therefore at most
/// `(max_attempts - 1) * max_backoff * (1 + jitter)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter: f64,
}

impl RetryPolicy {
    /// Create a policy with a fixed (non-growing, unjittered) delay schedule.
    ///
    /// A zero `max_attempts` is raised to one: every call gets at least one
    /// update attempt.
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Retry without sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 0.99);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// A fresh delay schedule for one reconciliation call.
    pub fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.jitter)
            .with_max_elapsed_time(None)
            .build()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
        .with_multiplier(config.multiplier)
        .with_jitter(config.jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
