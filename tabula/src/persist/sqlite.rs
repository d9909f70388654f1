//! SQLite store with in-memory cache.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};

use super::{KeyValueStore, StoreConfig, StoreError};

/// SQLite-backed key-value storage with DashMap read cache.
///
/// Survives process restarts when opened on a file, so a value written in
/// one session is what the next session binds to.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    table: String,
    cache: DashMap<String, String>,
}

impl SqliteStore {
    /// Open a store as described by `config`, creating the table if needed.
    ///
    /// The table name is spliced into every statement, so it must be a plain
    /// SQL identifier.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if !is_identifier(&config.table) {
            return Err(StoreError::InvalidTable(config.table.clone()));
        }

        let conn = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent)?;
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout)?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )",
                config.table
            ),
            [],
        )?;

        log::debug!("Opened key-value store table {:?}", config.table);

        Ok(Self {
            conn: Mutex::new(conn),
            table: config.table.clone(),
            cache: DashMap::new(),
        })
    }

    /// Open a store on the database file at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(&StoreConfig::file(path.as_ref()))
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(&StoreConfig::in_memory())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// ASCII letter or underscore, then letters, digits and underscores.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        // Check cache first
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        // Cache miss - query DB
        let result: Option<String> = self
            .conn()
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", self.table),
                [key],
                |row| row.get(0),
            )
            .optional()?;

        // Populate cache
        if let Some(ref value) = result {
            self.cache.insert(key.to_string(), value.clone());
        }

        Ok(result)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn().execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                self.table
            ),
            params![key, value],
        )?;

        // Update cache
        self.cache.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn().execute(
            &format!("DELETE FROM {} WHERE key = ?1", self.table),
            [key],
        )?;

        // Remove from cache
        self.cache.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("theme", "\"dark\"").unwrap();
        store.set("theme", "\"light\"").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"light\""));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_custom_table() {
        let config = StoreConfig::in_memory().with_table("prefs; DROP TABLE x");
        assert_eq!(config.table, "prefsDROPTABLEx");
        let store = SqliteStore::open(&config).unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_rejects_unusable_table_names() {
        for table in ["", "1kv", "kv-store", "kv store", "\"kv\""] {
            let mut config = StoreConfig::in_memory();
            config.table = table.to_string();
            match SqliteStore::open(&config) {
                Err(StoreError::InvalidTable(name)) => assert_eq!(name, table),
                Err(e) => panic!("{:?}: unexpected error {}", table, e),
                Ok(_) => panic!("{:?} accepted", table),
            }
        }

        // Sanitising everything away leaves nothing to open.
        let config = StoreConfig::in_memory().with_table("--");
        assert!(matches!(
            SqliteStore::open(&config),
            Err(StoreError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_accepts_plain_identifiers() {
        for table in ["kv", "_prefs", "Prefs_2"] {
            let store = SqliteStore::open(&StoreConfig::in_memory().with_table(table)).unwrap();
            store.set("k", "1").unwrap();
            assert_eq!(store.get("k").unwrap().as_deref(), Some("1"));
        }
    }
}
