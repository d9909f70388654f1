//! In-memory store implementation using DashMap

use dashmap::DashMap;

use super::{KeyValueStore, StoreError};

/// An in-memory key-value store backed by a concurrent hash map.
///
/// Data is lost when the store is dropped. With a quota, writes that would
/// push the total size of keys and values past the limit fail with
/// [`StoreError::QuotaExceeded`], the way a browser's storage does when full.
///
/// # Example
///
/// ```
/// use tabula::persist::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::with_quota(16);
/// store.set("name", "\"Jane\"").unwrap();
/// assert!(store.set("bio", "a very long biography").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates a new empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty store holding at most `bytes` of keys and values.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota: Some(bytes),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size of all keys and values in bytes.
    pub fn size(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.quota {
            let replaced = self
                .entries
                .get(key)
                .map(|entry| key.len() + entry.value().len())
                .unwrap_or(0);
            let needed = self.size() - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
