//! Immutable point-in-time view of cached entities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A cached value and the moment it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<E> {
    pub value: E,
    pub fetched_at: DateTime<Utc>,
}

impl<E> Entry<E> {
    pub fn new(value: E, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }

    /// Entry stamped with the current time.
    pub fn fresh(value: E) -> Self {
        Self::new(value, Utc::now())
    }
}

/// Keyed entities in insertion order, plus the publish time.
///
/// Never mutated after it is handed to the cache.
#[derive(Debug, Clone)]
pub struct Snapshot<E> {
    order: Vec<String>,
    entries: HashMap<String, Entry<E>>,
    published_at: Option<DateTime<Utc>>,
}

impl<E> Snapshot<E> {
    /// The state before anything has been published.
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            published_at: None,
        }
    }

    /// Build an unpublished snapshot. A repeated key keeps its first
    /// position and its last value.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Entry<E>)>,
    {
        let mut snapshot = Self::empty();
        for (key, entry) in entries {
            if snapshot.entries.insert(key.clone(), entry).is_none() {
                snapshot.order.push(key);
            }
        }
        snapshot
    }

    pub(crate) fn stamp(&mut self, at: DateTime<Utc>) {
        self.published_at = Some(at);
    }

    pub fn get(&self, key: &str) -> Option<&Entry<E>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry<E>)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (key.as_str(), entry)))
    }

    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.iter().map(|(_, entry)| &entry.value)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `None` until the snapshot has been published.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
}

impl<E> Default for Snapshot<E> {
    fn default() -> Self {
        Self::empty()
    }
}
