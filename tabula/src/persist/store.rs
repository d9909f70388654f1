//! Key-value store capability.

use super::StoreError;

/// Capability for durable string key-value storage.
///
/// Implementations handle raw serialized strings. [`Persisted`](super::Persisted)
/// wraps this with typed JSON serialization. Calls are synchronous and may
/// fail; callers decide how to recover.
pub trait KeyValueStore: Send + Sync {
    /// Get the serialized value for a key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set the serialized value for a key.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
