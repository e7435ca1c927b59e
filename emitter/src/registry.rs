//! Ordered storage of entries per event name.
//!
//! [`Registry`] maps event names to the entries registered for them, in
//! insertion order. It holds no locks and never invokes anything; the
//! [`Emitter`](crate::Emitter) wraps it for synchronization and dispatch.
//!
//! # Invariant
//!
//! An event name is a key of the map if and only if at least one entry is
//! stored for it. Every removal path drops the key when its sequence becomes
//! empty, so lookups never see an empty sequence.

use std::collections::HashMap;

/// Event name to ordered entries.
pub(crate) struct Registry<T> {
    events: HashMap<String, Vec<T>>,
}

impl<T> Registry<T> {
    /// Creates an empty registry with room for `capacity` event names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: HashMap::with_capacity(capacity),
        }
    }

    /// Appends an entry to the end of the sequence for `event`.
    pub fn push(&mut self, event: &str, entry: T) {
        match self.events.get_mut(event) {
            Some(entries) => entries.push(entry),
            None => {
                self.events.insert(event.to_owned(), vec![entry]);
            }
        }
    }

    /// Removes the first entry for `event` matching `pred`, scanning in
    /// insertion order. Drops the event name once its sequence is empty.
    pub fn remove_first<F>(&mut self, event: &str, pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let entries = self.events.get_mut(event)?;
        let index = entries.iter().position(pred)?;
        let entry = entries.remove(index);
        if entries.is_empty() {
            self.events.remove(event);
        }
        Some(entry)
    }

    /// Returns `true` if any entry for `event` matches `pred`.
    pub fn any<F>(&self, event: &str, pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.events
            .get(event)
            .is_some_and(|entries| entries.iter().any(pred))
    }

    /// Returns `true` if `event` has at least one entry.
    #[inline]
    pub fn contains(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    /// Number of entries for `event`.
    #[inline]
    pub fn len(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    /// Returns `true` if no event has entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the event names that currently have entries.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }
}

impl<T: Clone> Registry<T> {
    /// Copies the sequence for `event`, or `None` if it has no entries.
    pub fn snapshot(&self, event: &str) -> Option<Vec<T>> {
        self.events.get(event).cloned()
    }
}
