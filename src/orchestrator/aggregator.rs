//! Aggregate progress registry and observer fan-out

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::replicate::ReplicateId;
use crate::traits::ProgressListener;

/// Shared progress registry with synchronous observer notification
///
/// Holds one entry per constructed replicate and the set of registered
/// progress listeners. Updating an entry, recomputing the aggregate as the
/// arithmetic mean over the full registry, and notifying listeners happen
/// inside a single critical section — the one serialization point in the
/// harness — so observers always see a consistent snapshot.
///
/// Replicates excluded from the registry (those that failed to bind and
/// will never report progress) do not contribute to the denominator.
pub struct ProgressHub {
    inner: Mutex<HubState>,
}

struct HubState {
    entries: Vec<ProgressEntry>,
    listeners: Vec<Arc<dyn ProgressListener>>,
}

#[derive(Debug, Clone, Copy)]
struct ProgressEntry {
    percent: f64,
    excluded: bool,
}

impl ProgressHub {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HubState {
                entries: Vec::new(),
                listeners: Vec::new(),
            }),
        }
    }

    /// Add a zero-valued entry for a newly constructed replicate
    pub(crate) fn register(&self, id: ReplicateId) {
        let mut state = self.lock();
        debug_assert_eq!(state.entries.len(), id.0);
        state.entries.push(ProgressEntry {
            percent: 0.0,
            excluded: false,
        });
    }

    /// Exclude a replicate from the aggregate denominator and notify
    /// listeners of the recomputed aggregate
    pub(crate) fn exclude(&self, id: ReplicateId) {
        let state = &mut *self.lock();
        if let Some(entry) = state.entries.get_mut(id.0) {
            entry.excluded = true;
        }
        let aggregate = mean(&state.entries);
        notify(&state.listeners, aggregate);
    }

    /// Update one replicate's completion percentage
    ///
    /// Recomputes the aggregate from the full registry and synchronously
    /// notifies every registered listener with the new value.
    pub(crate) fn update(&self, id: ReplicateId, percent: f64) -> f64 {
        let state = &mut *self.lock();
        if let Some(entry) = state.entries.get_mut(id.0) {
            entry.percent = percent.clamp(0.0, 100.0);
        }
        let aggregate = mean(&state.entries);
        notify(&state.listeners, aggregate);
        aggregate
    }

    /// Current aggregate completion percentage
    pub fn aggregate(&self) -> f64 {
        mean(&self.lock().entries)
    }

    /// Register a progress listener
    ///
    /// Registration is not deduplicated: a listener added twice is notified
    /// twice per update.
    pub fn add_listener(&self, listener: Arc<dyn ProgressListener>) {
        self.lock().listeners.push(listener);
    }

    /// Remove a previously registered listener by pointer identity
    ///
    /// Removes one registration per call.
    pub fn remove_listener(&self, listener: &Arc<dyn ProgressListener>) {
        let mut state = self.lock();
        let target = Arc::as_ptr(listener) as *const ();
        if let Some(position) = state
            .listeners
            .iter()
            .position(|l| Arc::as_ptr(l) as *const () == target)
        {
            state.listeners.remove(position);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ProgressHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ProgressHub")
            .field("entries", &state.entries.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

fn mean(entries: &[ProgressEntry]) -> f64 {
    let (sum, count) = entries
        .iter()
        .filter(|entry| !entry.excluded)
        .fold((0.0, 0usize), |(sum, count), entry| {
            (sum + entry.percent, count + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn notify(listeners: &[Arc<dyn ProgressListener>], aggregate: f64) {
    for listener in listeners {
        listener.on_progress(aggregate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        notifications: AtomicUsize,
        last: Mutex<Option<f64>>,
    }

    impl CountingListener {
        fn new() -> Self {
            Self {
                notifications: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }
    }

    impl ProgressListener for CountingListener {
        fn on_progress(&self, aggregate: f64) {
            self.notifications.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(aggregate);
        }
    }

    fn hub_with_entries(n: usize) -> ProgressHub {
        let hub = ProgressHub::new();
        for i in 0..n {
            hub.register(ReplicateId(i));
        }
        hub
    }

    #[test]
    fn test_registry_starts_at_zero() {
        let hub = hub_with_entries(3);
        assert_eq!(hub.aggregate(), 0.0);
    }

    #[test]
    fn test_update_recomputes_mean_from_full_registry() {
        let hub = hub_with_entries(2);

        assert_eq!(hub.update(ReplicateId(0), 50.0), 25.0);
        assert_eq!(hub.update(ReplicateId(1), 100.0), 75.0);

        // Re-updating an entry replaces it rather than drifting the mean.
        assert_eq!(hub.update(ReplicateId(0), 0.0), 50.0);
    }

    #[test]
    fn test_update_clamps_to_percentage_range() {
        let hub = hub_with_entries(1);

        assert_eq!(hub.update(ReplicateId(0), 250.0), 100.0);
        assert_eq!(hub.update(ReplicateId(0), -10.0), 0.0);
    }

    #[test]
    fn test_excluded_entries_leave_the_denominator() {
        let hub = hub_with_entries(3);
        hub.exclude(ReplicateId(1));

        hub.update(ReplicateId(0), 100.0);
        hub.update(ReplicateId(2), 100.0);

        assert_eq!(hub.aggregate(), 100.0);
    }

    #[test]
    fn test_all_excluded_aggregate_is_zero() {
        let hub = hub_with_entries(1);
        hub.exclude(ReplicateId(0));
        assert_eq!(hub.aggregate(), 0.0);
    }

    #[test]
    fn test_listener_notified_synchronously() {
        let hub = hub_with_entries(1);
        let listener = Arc::new(CountingListener::new());
        hub.add_listener(listener.clone());

        hub.update(ReplicateId(0), 40.0);

        assert_eq!(listener.notifications.load(Ordering::SeqCst), 1);
        assert_eq!(*listener.last.lock().unwrap(), Some(40.0));
    }

    #[test]
    fn test_duplicate_listener_notified_twice() {
        let hub = hub_with_entries(1);
        let listener = Arc::new(CountingListener::new());
        hub.add_listener(listener.clone());
        hub.add_listener(listener.clone());

        hub.update(ReplicateId(0), 10.0);

        assert_eq!(listener.notifications.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_removed_listener_not_notified() {
        let hub = hub_with_entries(1);
        let listener = Arc::new(CountingListener::new());
        let handle: Arc<dyn ProgressListener> = listener.clone();
        hub.add_listener(handle.clone());
        hub.remove_listener(&handle);

        hub.update(ReplicateId(0), 10.0);

        assert_eq!(listener.notifications.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_listener_drops_one_registration() {
        let hub = hub_with_entries(1);
        let listener = Arc::new(CountingListener::new());
        let handle: Arc<dyn ProgressListener> = listener.clone();
        hub.add_listener(handle.clone());
        hub.add_listener(handle.clone());
        hub.remove_listener(&handle);

        hub.update(ReplicateId(0), 10.0);

        assert_eq!(listener.notifications.load(Ordering::SeqCst), 1);
    }
}
