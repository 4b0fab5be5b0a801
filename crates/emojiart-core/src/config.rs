//! Document configuration.

use crate::storage::{DEFAULT_AUTOSAVE_KEY, FileStorage, Storage, StorageResult};
use crate::undo::DEFAULT_UNDO_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Settings for an [`EmojiArtDocument`](crate::EmojiArtDocument).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Storage key of the autosave entry.
    #[serde(default = "default_autosave_key")]
    pub autosave_key: String,

    /// Directory for file storage. `None` uses the platform data directory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Maximum number of undo steps kept.
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,
}

fn default_autosave_key() -> String {
    DEFAULT_AUTOSAVE_KEY.to_string()
}

fn default_undo_limit() -> usize {
    DEFAULT_UNDO_LIMIT
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            autosave_key: default_autosave_key(),
            storage_dir: None,
            undo_limit: default_undo_limit(),
        }
    }
}

impl DocumentConfig {
    /// Open the file storage this config points at.
    pub fn open_storage(&self) -> StorageResult<Arc<dyn Storage>> {
        let storage = match &self.storage_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        Ok(Arc::new(storage))
    }
}
