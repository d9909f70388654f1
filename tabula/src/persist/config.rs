//! Store configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`SqliteStore`](super::SqliteStore).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tabula::persist::StoreConfig;
///
/// let config = StoreConfig::file("settings.db")
///     .with_table("user_prefs")
///     .with_busy_timeout(Duration::from_secs(1));
/// assert_eq!(config.table, "user_prefs");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,

    /// Table holding the key-value pairs.
    ///
    /// Default: "kv"
    pub table: String,

    /// How long to wait on a locked database before failing.
    ///
    /// Default: 5 seconds
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            table: "kv".to_string(),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// In-memory database with default settings.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Database file at `path` with default settings.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Sets the table name.
    ///
    /// Only ASCII letters, digits and underscores are kept.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table
            .into()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        self
    }

    /// Sets the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}
