//! Persisted cells against memory, SQLite and failing stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tabula::persist::{
    CollectingSink, KeyValueStore, MemoryStore, Persisted, SqliteStore, StoreConfig, StoreError,
    Update,
};

/// Store whose reads and writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn failing_reads() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }

    fn failing_writes() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Prefs {
    theme: String,
    columns: Vec<String>,
}

#[test]
fn test_missing_key_uses_initial_without_writing() {
    let store = Arc::new(MemoryStore::new());
    let name = Persisted::bind(store.clone(), "demo-name", String::new());
    assert_eq!(name.get(), "");
    assert_eq!(name.key(), "demo-name");
    assert!(store.is_empty());
}

#[test]
fn test_value_survives_rebinding() {
    let store = Arc::new(MemoryStore::new());
    let prefs = Prefs {
        theme: "dark".into(),
        columns: vec!["name".into(), "age".into()],
    };

    let first = Persisted::bind(store.clone(), "prefs", Prefs {
        theme: "light".into(),
        columns: Vec::new(),
    });
    first.set(prefs.clone());
    drop(first);

    let second = Persisted::bind(store.clone(), "prefs", Prefs {
        theme: "light".into(),
        columns: Vec::new(),
    });
    assert_eq!(second.get(), prefs);
    assert_eq!(
        store.get("prefs").unwrap().as_deref(),
        Some(r#"{"theme":"dark","columns":["name","age"]}"#)
    );
}

#[test]
fn test_function_update_persists_new_value() {
    let store = Arc::new(MemoryStore::new());
    let count = Persisted::bind(store.clone(), "count", 5i64);

    count.update(|n| n + 1);
    assert_eq!(count.get(), 6);
    assert_eq!(store.get("count").unwrap().as_deref(), Some("6"));

    count.set(Update::apply(|n: &i64| n * 10));
    assert_eq!(count.get(), 60);
    assert_eq!(store.get("count").unwrap().as_deref(), Some("60"));
}

#[test]
fn test_stored_value_beats_initial() {
    let store = Arc::new(MemoryStore::new());
    store.set("count", "41").unwrap();
    let count = Persisted::bind(store, "count", 0u32);
    assert_eq!(count.get(), 41);
}

#[test]
fn test_read_failure_falls_back_to_initial() {
    let store = Arc::new(FlakyStore::failing_reads());
    let sink = Arc::new(CollectingSink::new());

    let name = Persisted::bind_with_sink(store.clone(), "demo-name", "guest".to_string(), sink.clone());
    assert_eq!(name.get(), "guest");

    let messages = sink.take();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("demo-name"));

    // Writes still go through once the store is back.
    name.set("Jane".to_string());
    assert_eq!(store.raw("demo-name").as_deref(), Some("\"Jane\""));
    assert!(sink.messages().is_empty());
}

#[test]
fn test_undecodable_value_falls_back_to_initial() {
    let store = Arc::new(MemoryStore::new());
    store.set("count", "not json").unwrap();
    let sink = Arc::new(CollectingSink::new());

    let count = Persisted::bind_with_sink(store, "count", 3u32, sink.clone());
    assert_eq!(count.get(), 3);
    assert_eq!(sink.messages().len(), 1);
}

#[test]
fn test_write_failure_keeps_in_memory_value() {
    let store = Arc::new(FlakyStore::failing_writes());
    let sink = Arc::new(CollectingSink::new());

    let name = Persisted::bind_with_sink(store.clone(), "demo-name", String::new(), sink.clone());
    name.set("Jane".to_string());

    assert_eq!(name.get(), "Jane");
    assert_eq!(store.raw("demo-name"), None);
    assert_eq!(sink.messages().len(), 1);
}

#[test]
fn test_quota_exceeded_is_reported() {
    let store = Arc::new(MemoryStore::with_quota(12));
    let sink = Arc::new(CollectingSink::new());

    let bio = Persisted::bind_with_sink(store.clone(), "bio", String::new(), sink.clone());
    bio.set("a biography far too long for the quota".to_string());

    assert_eq!(bio.get(), "a biography far too long for the quota");
    assert!(store.is_empty());
    let messages = sink.take();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("quota"));
}

#[test]
fn test_remove_resets_to_initial() {
    let store = Arc::new(MemoryStore::new());
    let name = Persisted::bind(store.clone(), "demo-name", "guest".to_string());
    name.set("Jane".to_string());
    assert_eq!(store.len(), 1);

    name.remove();
    assert_eq!(name.get(), "guest");
    assert!(store.is_empty());

    let reloaded = Persisted::bind(store, "demo-name", "nobody".to_string());
    assert_eq!(reloaded.get(), "nobody");
}

#[test]
fn test_last_write_wins_for_shared_key() {
    let store = Arc::new(MemoryStore::new());
    let a = Persisted::bind(store.clone(), "shared", 0u32);
    let b = Persisted::bind(store.clone(), "shared", 0u32);

    a.set(1u32);
    b.set(2u32);
    assert_eq!(a.get(), 1);
    assert_eq!(b.get(), 2);
    assert_eq!(store.get("shared").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_state_handle_tracks_writes() {
    let store = Arc::new(MemoryStore::new());
    let name = Persisted::bind(store, "demo-name", String::new());
    let state = name.state();
    assert!(!state.is_dirty());

    name.set("Jane".to_string());
    assert!(state.is_dirty());
    assert_eq!(state.get(), "Jane");
}

#[test]
fn test_sqlite_round_trip_across_connections() {
    let dir = std::env::temp_dir().join(format!("tabula-persist-{}", std::process::id()));
    let path = dir.join("state.db");
    let _ = std::fs::remove_file(&path);

    {
        let store = Arc::new(SqliteStore::open_path(&path).unwrap());
        let name = Persisted::bind(store, "demo-name", String::new());
        name.set("Jane Smith".to_string());
    }

    let store = Arc::new(SqliteStore::open(&StoreConfig::file(&path)).unwrap());
    let name = Persisted::bind(store, "demo-name", String::new());
    assert_eq!(name.get(), "Jane Smith");

    let _ = std::fs::remove_dir_all(&dir);
}
