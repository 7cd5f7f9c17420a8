//! Framework-independent observer registration.
//!
//! `Observers<T>` keeps a list of callbacks keyed by `SubscriptionId`.
//! `notify` snapshots the list and invokes each callback after releasing the
//! lock, so a callback may subscribe, unsubscribe or read back into its owner
//! without deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct Observers<T> {
    callbacks: Mutex<Vec<(SubscriptionId, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().push((id, Arc::new(callback)));
        tracing::trace!(id = id.0, "observer subscribed");
        id
    }

    /// Returns `true` if `id` was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        before != callbacks.len()
    }

    pub fn notify(&self, value: &T) {
        self.notify_while(value, || true);
    }

    /// Like `notify`, but checks `proceed` before each callback and stops at
    /// the first `false`.
    pub fn notify_while(&self, value: &T, proceed: impl Fn() -> bool) {
        let snapshot: Vec<Callback<T>> = self
            .callbacks
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            if !proceed() {
                tracing::trace!("observer delivery stopped");
                return;
            }
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}
