//! Persisted key-value cells.
//!
//! A [`Persisted`] cell holds a value in memory and mirrors every update into
//! an injected [`KeyValueStore`] as JSON. The store is consulted only when the
//! cell is bound. Store and encoding failures never reach the caller; they go
//! to a [`DiagnosticSink`] and the cell keeps working from memory.
//!
//! Two cells bound to the same key do not coordinate: whichever writes last
//! wins in the store, and neither sees the other's in-memory value.

mod config;
mod diagnostics;
mod error;
mod memory;
mod sqlite;
mod store;

pub use config::StoreConfig;
pub use diagnostics::{CollectingSink, DiagnosticSink, LogSink};
pub use error::{PersistError, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::KeyValueStore;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::state::State;

/// A new value for a [`Persisted`] cell: either a literal or a function of
/// the current value.
pub enum Update<T> {
    /// Replace the value.
    Replace(T),
    /// Compute the value from the current one.
    Apply(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// Update computed from the current value.
    pub fn apply(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Apply(Box::new(f))
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}

/// A value bound to a key in an external store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tabula::persist::{MemoryStore, Persisted};
///
/// let store = Arc::new(MemoryStore::new());
///
/// let name = Persisted::bind(store.clone(), "user-name", String::new());
/// name.set("Jane".to_string());
/// name.update(|prev| format!("{prev} Smith"));
///
/// // A fresh binding (say, after a restart) reads the stored value.
/// let reloaded = Persisted::bind(store, "user-name", String::new());
/// assert_eq!(reloaded.get(), "Jane Smith");
/// ```
pub struct Persisted<T> {
    key: String,
    initial: T,
    value: State<T>,
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Bind `key`, reporting failures through the `log` facade.
    pub fn bind(store: Arc<dyn KeyValueStore>, key: impl Into<String>, initial: T) -> Self {
        Self::bind_with_sink(store, key, initial, Arc::new(LogSink))
    }

    /// Bind `key`, reporting failures to `sink`.
    ///
    /// The stored value becomes the current value if present and decodable;
    /// otherwise the current value is `initial`.
    pub fn bind_with_sink(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        initial: T,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let key = key.into();
        let value = match Self::load(store.as_ref(), &key) {
            Ok(Some(stored)) => stored,
            Ok(None) => initial.clone(),
            Err(failure) => {
                sink.report(&failure);
                initial.clone()
            }
        };

        Self {
            key,
            initial,
            value: State::new(value),
            store,
            sink,
        }
    }

    fn load(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, PersistError> {
        let raw = store.get(key).map_err(|source| PersistError::Read {
            key: key.to_string(),
            source,
        })?;
        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|source| PersistError::Deserialize {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// The bound key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Shared handle to the in-memory value, for hosts that watch it.
    pub fn state(&self) -> State<T> {
        self.value.clone()
    }

    /// Set a new value, literal or computed from the current one.
    ///
    /// The in-memory value changes first and stays changed even if writing
    /// to the store fails.
    pub fn set(&self, update: impl Into<Update<T>>) {
        let update = update.into();
        let encoded = self.value.update_with(|current| {
            *current = match update {
                Update::Replace(value) => value,
                Update::Apply(f) => f(&*current),
            };
            serde_json::to_string(&*current)
        });

        let result = encoded
            .map_err(|source| PersistError::Serialize {
                key: self.key.clone(),
                source,
            })
            .and_then(|json| {
                self.store
                    .set(&self.key, &json)
                    .map_err(|source| PersistError::Write {
                        key: self.key.clone(),
                        source,
                    })
            });

        if let Err(failure) = result {
            self.sink.report(&failure);
        }
    }

    /// Set a value computed from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.set(Update::apply(f));
    }

    /// Delete the key from the store and reset to the initial value.
    pub fn remove(&self) {
        self.value.set(self.initial.clone());
        if let Err(source) = self.store.remove(&self.key) {
            self.sink.report(&PersistError::Write {
                key: self.key.clone(),
                source,
            });
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
