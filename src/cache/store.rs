//! The shared, atomically swapped cache.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::cache::snapshot::Snapshot;
use crate::observability::metrics;

/// Holds the current snapshot. Readers load a pointer and never wait on
/// the writer; publishing swaps in a complete replacement.
pub struct RefreshingCache<E> {
    current: ArcSwap<Snapshot<E>>,
}

impl<E> RefreshingCache<E> {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::empty()),
        }
    }

    /// The current snapshot. Several reads against the returned value are
    /// mutually consistent.
    pub fn snapshot(&self) -> Arc<Snapshot<E>> {
        self.current.load_full()
    }

    /// Stamp `snapshot` with the current time and make it current.
    pub fn publish(&self, mut snapshot: Snapshot<E>) -> DateTime<Utc> {
        let at = Utc::now();
        snapshot.stamp(at);
        let entities = snapshot.len();
        self.current.store(Arc::new(snapshot));
        metrics::record_snapshot_size(entities);
        at
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.current.load().published_at()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl<E: Clone> RefreshingCache<E> {
    /// Entity for `key` in the current snapshot. Never fetches.
    pub fn get(&self, key: &str) -> Option<E> {
        self.current.load().get(key).map(|entry| entry.value.clone())
    }

    /// Every entity in the current snapshot, and when it was published.
    pub fn get_all(&self) -> (Vec<E>, Option<DateTime<Utc>>) {
        let snapshot = self.current.load();
        (snapshot.values().cloned().collect(), snapshot.published_at())
    }
}

impl<E> Default for RefreshingCache<E> {
    fn default() -> Self {
        Self::new()
    }
}
