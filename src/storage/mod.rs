//! Storage layer for copycache
//!
//! The history store treats persistence as an opaque key-value blob store.
//! [`KeyValueStore`] is that seam; [`SqliteStore`] backs the CLI and daemon,
//! [`MemoryStore`] backs tests and embedders that don't need durability.

pub mod db;
pub mod memory;
pub mod models;

pub use db::SqliteStore;
pub use memory::MemoryStore;
pub use models::*;

/// Errors raised by a persistence adapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The SQLite backend failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A persisted blob could not be encoded or decoded.
    #[error("Failed to (de)serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem access failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is unusable (e.g. a poisoned lock or closed writer).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// An opaque key-value blob store with get/set semantics.
///
/// No atomicity is provided across a `get` followed by a `set`; callers
/// that need read-modify-write isolation must serialize access themselves.
pub trait KeyValueStore: Send {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
