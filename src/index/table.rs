//! Index implementation
//!
//! HashMap-based index behind a single RwLock.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{IndexEntry, SlotLocation};

/// In-memory map from key to its value and log positions
#[derive(Debug, Default)]
pub struct Index {
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl Index {
    /// Create a new empty Index
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `key` (read lock)
    pub fn lookup(&self, key: &str) -> Option<IndexEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Get only the log positions for `key` (read lock, no value clone)
    pub fn locate(&self, key: &str) -> Option<SlotLocation> {
        self.entries.read().get(key).map(IndexEntry::location)
    }

    /// All entries whose key starts with `prefix`, in no particular order
    pub fn lookup_prefix(&self, prefix: &str) -> Vec<IndexEntry> {
        self.entries
            .read()
            .values()
            .filter(|entry| entry.key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Insert or replace the entry for `entry.key` (write lock).
    ///
    /// Returns the previous entry, if any.
    pub fn upsert(&self, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.write().insert(entry.key.clone(), entry)
    }

    /// Replace the whole map in one write-locked pass
    pub fn load(&self, entries: HashMap<String, IndexEntry>) {
        *self.entries.write() = entries;
    }

    /// Remove all entries (write lock)
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Run `f` while holding the write lock, then empty the map if it succeeded.
    ///
    /// No lookup or upsert can interleave with `f`.
    pub fn clear_with<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut entries = self.entries.write();
        let out = f()?;
        entries.clear();
        Ok(out)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of every key
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}
