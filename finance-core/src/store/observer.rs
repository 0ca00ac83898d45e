use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Synchronous observer list. Every callback sees every published value in
/// publication order; nothing is buffered for late subscribers.
pub struct Observers<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Box::new(callback)));
        id
    }

    /// Returns `false` when the id was not subscribed.
    pub fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold the list while a value is published. Callers take this before
    /// releasing their own state lock so publications cannot reorder.
    pub(crate) fn begin_publish(&self) -> Publication<'_, T> {
        Publication { entries: self.lock() }
    }

    pub fn notify(
        &self,
        value: &T,
    ) {
        self.begin_publish().send(value);
    }

    // A panicking observer poisons the list; keep serving the rest.
    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback<T>)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Publication<'a, T> {
    entries: MutexGuard<'a, Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Publication<'_, T> {
    pub(crate) fn send(
        self,
        value: &T,
    ) {
        for (_, callback) in self.entries.iter() {
            callback(value);
        }
    }
}
