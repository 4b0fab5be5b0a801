//! Storage abstraction for persistence.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSaver, DEFAULT_AUTOSAVE_KEY};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for byte-oriented storage backends.
///
/// Entries are addressed by a string key. Implementations must be
/// `Send + Sync` since the autosave worker writes from its own thread.
pub trait Storage: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous entry.
    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Read the entry stored under `key`.
    fn load(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove an entry. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if an entry exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
