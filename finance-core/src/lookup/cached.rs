use std::sync::{Mutex, MutexGuard};

/// A list fetched at most once until cleared.
#[derive(Debug)]
pub(crate) struct CachedList<T> {
    inner: Mutex<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    items: Vec<T>,
    loaded: bool,
}

impl<T: Clone> CachedList<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Slot {
                items: Vec::new(),
                loaded: false,
            }),
        }
    }

    /// Cached items when a previous fetch succeeded, even an empty one.
    pub(crate) fn fresh(&self) -> Option<Vec<T>> {
        let slot = self.lock();
        slot.loaded.then(|| slot.items.clone())
    }

    pub(crate) fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    pub(crate) fn find(
        &self,
        predicate: impl Fn(&T) -> bool,
    ) -> Option<T> {
        self.lock().items.iter().find(|item| predicate(item)).cloned()
    }

    pub(crate) fn filter(
        &self,
        predicate: impl Fn(&T) -> bool,
    ) -> Vec<T> {
        self.lock()
            .items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Install a fetched list and mark the cache loaded.
    pub(crate) fn fill(
        &self,
        items: Vec<T>,
    ) {
        let mut slot = self.lock();
        slot.items = items;
        slot.loaded = true;
    }

    /// Install placeholder items without marking the cache loaded, so the
    /// next load fetches again.
    pub(crate) fn stand_in(
        &self,
        items: Vec<T>,
    ) {
        let mut slot = self.lock();
        slot.items = items;
        slot.loaded = false;
    }

    pub(crate) fn clear(&self) {
        self.stand_in(Vec::new());
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
