//! Kind-specific comparison and mutation, plugged into the convergence engine.

/// Decides when a live object has drifted and how to bring it back.
///
/// `apply` overwrites the parts of `current` that should adopt `desired`'s
/// values. It must be idempotent: the engine may call it on several fresh
/// observations of the same object within one reconciliation.
pub trait ConvergeStrategy<R>: Send + Sync {
    /// Whether `current` already matches `desired` on the fields that matter.
    fn equals(&self, current: &R, desired: &R) -> bool;

    /// Copy the desired state onto `current`, leaving its metadata alone.
    fn apply(&self, current: &mut R, desired: &R);
}

/// Strategy assembled from a pair of closures.
pub struct FnStrategy<E, A> {
    equals: E,
    apply: A,
}

impl<E, A> FnStrategy<E, A> {
    pub const fn new(equals: E, apply: A) -> Self {
        Self { equals, apply }
    }
}

impl<R, E, A> ConvergeStrategy<R> for FnStrategy<E, A>
where
    E: Fn(&R, &R) -> bool + Send + Sync,
    A: Fn(&mut R, &R) + Send + Sync,
{
    fn equals(&self, current: &R, desired: &R) -> bool {
        (self.equals)(current, desired)
    }

    fn apply(&self, current: &mut R, desired: &R) {
        (self.apply)(current, desired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_strategy_delegates() {
        let strategy = FnStrategy::new(
            |current: &String, desired: &String| current == desired,
            |current: &mut String, desired: &String| current.clone_from(desired),
        );

        let mut current = "a".to_string();
        let desired = "b".to_string();

        assert!(!strategy.equals(&current, &desired));
        strategy.apply(&mut current, &desired);
        assert!(strategy.equals(&current, &desired));
    }
}
