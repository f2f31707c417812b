//! Cooperative cancellation primitives

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag polled between iterations
///
/// Cloning yields another handle to the same flag. Setting the flag is
/// advisory, not preemptive: a running replicate observes it at its next
/// iteration boundary and then resolves through its normal finish path.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn set(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_starts_unset() {
        let flag = CancelFlag::new();
        assert!(!flag.is_set());
    }

    #[test]
    fn test_cancel_flag_set() {
        let flag = CancelFlag::new();
        flag.set();
        assert!(flag.is_set());
    }

    #[test]
    fn test_cancel_flag_clones_share_state() {
        let flag = CancelFlag::new();
        let clone = flag.clone();

        clone.set();

        assert!(flag.is_set());
        assert!(clone.is_set());
    }
}
