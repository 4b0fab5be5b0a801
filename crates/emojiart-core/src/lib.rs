//! EmojiArt Core Library
//!
//! Document model, autosave and undo for the EmojiArt drawing board. The
//! presentation layer drives an [`EmojiArtDocument`] through its intents and
//! redraws from the state it exposes.

pub mod config;
pub mod document;
pub mod edit;
pub mod emoji_art;
pub mod observer;
pub mod palette;
pub mod storage;
pub mod undo;

pub use config::DocumentConfig;
pub use document::{EmojiArtDocument, emoji_size};
pub use edit::Edit;
pub use emoji_art::{DecodeError, Emoji, EmojiArt, EmojiId, MIN_EMOJI_SIZE, Position};
pub use observer::{Observers, SubscriptionId};
pub use palette::{Palette, PaletteStore};
pub use storage::{AutoSaver, FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use undo::{UndoEntry, UndoManager};
