//! Persistence error types

/// Failure of the external key-value store itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Writing would exceed the store's quota.
    #[error("quota exceeded writing {key:?}: {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The configured table name is not a plain SQL identifier.
    #[error("invalid table name {0:?}")]
    InvalidTable(String),

    /// SQLite error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A recovered failure of a [`Persisted`](super::Persisted) cell.
///
/// These never propagate to the caller; they are reported to the cell's
/// [`DiagnosticSink`](super::DiagnosticSink).
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading the key failed while binding.
    #[error("error reading key {key:?}: {source}")]
    Read { key: String, source: StoreError },

    /// Stored content is not a valid encoding of the value type.
    #[error("error decoding key {key:?}: {source}")]
    Deserialize {
        key: String,
        source: serde_json::Error,
    },

    /// The new value could not be encoded.
    #[error("error encoding key {key:?}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// Writing or removing the key failed.
    #[error("error writing key {key:?}: {source}")]
    Write { key: String, source: StoreError },
}

impl PersistError {
    /// The key the failure concerns.
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Deserialize { key, .. }
            | Self::Serialize { key, .. }
            | Self::Write { key, .. } => key,
        }
    }
}
