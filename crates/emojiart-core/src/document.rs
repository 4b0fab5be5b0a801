//! The document controller used by the presentation layer.

use crate::config::DocumentConfig;
use crate::edit::Edit;
use crate::emoji_art::{Emoji, EmojiArt, EmojiId, Position};
use crate::observer::{Observers, SubscriptionId};
use crate::storage::{AutoSaver, MemoryStorage, Storage};
use crate::undo::UndoManager;
use std::sync::Arc;
use url::Url;

/// Convert a continuous size (e.g. after a pinch) to a model size.
///
/// Truncates toward zero; anything below 1, including NaN, becomes 1.
pub fn emoji_size(size: f64) -> u32 {
    (size as u32).max(crate::emoji_art::MIN_EMOJI_SIZE)
}

/// An editable, autosaved, undoable EmojiArt document.
///
/// Every intent mutates the held [`EmojiArt`], records its inverse in the
/// undo history, queues an autosave and notifies observers. Intents that
/// target an emoji which no longer exists do nothing at all.
#[derive(Debug)]
pub struct EmojiArtDocument {
    emoji_art: EmojiArt,
    undo_manager: UndoManager<Edit>,
    autosaver: AutoSaver,
    observers: Observers<EmojiArt>,
}

impl Default for EmojiArtDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiArtDocument {
    /// Open the autosaved document from the default location, or start empty.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Open the autosaved document described by `config`, or start empty.
    ///
    /// If the configured storage cannot be opened the document is kept in
    /// memory only.
    pub fn with_config(config: DocumentConfig) -> Self {
        let storage = match config.open_storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("Storage unavailable, changes will not persist: {}", e);
                Arc::new(MemoryStorage::new())
            }
        };
        Self::with_storage(storage, config)
    }

    /// Open the autosaved document from `storage`, or start empty.
    pub fn with_storage(storage: Arc<dyn Storage>, config: DocumentConfig) -> Self {
        let autosaver = AutoSaver::new(storage, config.autosave_key);
        let emoji_art = autosaver.load().unwrap_or_default();
        Self {
            emoji_art,
            undo_manager: UndoManager::with_limit(config.undo_limit),
            autosaver,
            observers: Observers::new(),
        }
    }

    /// Replace the undo history, e.g. to share a preconfigured one.
    pub fn with_undo_manager(mut self, undo_manager: UndoManager<Edit>) -> Self {
        self.undo_manager = undo_manager;
        self
    }

    pub fn emoji_art(&self) -> &EmojiArt {
        &self.emoji_art
    }

    pub fn background(&self) -> Option<&Url> {
        self.emoji_art.background()
    }

    pub fn emojis(&self) -> &[Emoji] {
        self.emoji_art.emojis()
    }

    pub fn undo_manager(&self) -> &UndoManager<Edit> {
        &self.undo_manager
    }

    pub fn set_background(&mut self, background: Option<Url>) {
        self.perform("Set Background", Edit::SetBackground(background));
    }

    /// Place a new emoji on top of the others and return its id.
    pub fn add_emoji(&mut self, emoji: &str, position: Position, size: f64) -> EmojiId {
        let id = self.emoji_art.add_emoji(emoji, position, emoji_size(size));
        log::debug!("Added emoji {} ({})", id, emoji);
        self.undo_manager.register("Add Emoji", Edit::Delete(id));
        self.changed();
        id
    }

    pub fn delete_emoji(&mut self, id: EmojiId) {
        self.perform("Delete Emoji", Edit::Delete(id));
    }

    pub fn update_emoji_position(&mut self, id: EmojiId, position: Position) {
        self.perform("Move", Edit::Move { id, position });
    }

    pub fn update_emoji_size(&mut self, id: EmojiId, size: f64) {
        self.perform(
            "Resize",
            Edit::Resize {
                id,
                size: emoji_size(size),
            },
        );
    }

    fn perform(&mut self, name: &str, edit: Edit) {
        match edit.apply(&mut self.emoji_art) {
            Some(inverse) => {
                log::debug!("{}: registered {:?}", name, inverse);
                self.undo_manager.register(name, inverse);
                self.changed();
            }
            None => log::debug!("{}: target no longer exists, ignoring", name),
        }
    }

    /// Revert the newest action. Returns false if there is nothing to undo
    /// or the newest entry no longer applies.
    pub fn undo(&mut self) -> bool {
        let emoji_art = &mut self.emoji_art;
        let undone = self.undo_manager.undo(|edit| edit.apply(emoji_art));
        if undone {
            self.changed();
        }
        undone
    }

    /// Re-apply the most recently undone action. Returns false if there is
    /// nothing to redo or the entry no longer applies.
    pub fn redo(&mut self) -> bool {
        let emoji_art = &mut self.emoji_art;
        let redone = self.undo_manager.redo(|edit| edit.apply(emoji_art));
        if redone {
            self.changed();
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    pub fn undo_action_name(&self) -> Option<&str> {
        self.undo_manager.undo_action_name()
    }

    pub fn redo_action_name(&self) -> Option<&str> {
        self.undo_manager.redo_action_name()
    }

    /// Call `callback` with the new state after every change.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&EmojiArt) + Send + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Block until all pending autosaves are written.
    pub fn flush(&self) {
        self.autosaver.flush();
    }

    fn changed(&mut self) {
        self.autosaver.submit(&self.emoji_art);
        self.observers.notify(&self.emoji_art);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DEFAULT_AUTOSAVE_KEY;
    use std::sync::Mutex;

    fn memory_document() -> (Arc<MemoryStorage>, EmojiArtDocument) {
        let storage = Arc::new(MemoryStorage::new());
        let document =
            EmojiArtDocument::with_storage(storage.clone(), DocumentConfig::default());
        (storage, document)
    }

    fn stored(storage: &MemoryStorage) -> EmojiArt {
        EmojiArt::from_json(&storage.load(DEFAULT_AUTOSAVE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_emoji_size_conversion() {
        assert_eq!(emoji_size(79.9), 79);
        assert_eq!(emoji_size(0.4), 1);
        assert_eq!(emoji_size(-12.0), 1);
        assert_eq!(emoji_size(f64::NAN), 1);
    }

    #[test]
    fn test_starts_empty() {
        let (_, document) = memory_document();
        assert!(document.emojis().is_empty());
        assert!(document.background().is_none());
        assert!(!document.can_undo());
        assert!(!document.can_redo());
    }

    #[test]
    fn test_undo_add_emoji() {
        let (_, mut document) = memory_document();
        let id = document.add_emoji("🔥", Position::new(200, 100), 80.0);
        assert_eq!(id, 1);
        assert_eq!(document.undo_action_name(), Some("Add Emoji"));

        assert!(document.undo());
        assert!(document.emojis().is_empty());
        assert_eq!(document.redo_action_name(), Some("Add Emoji"));

        assert!(document.redo());
        assert_eq!(document.emojis().len(), 1);
        assert_eq!(document.emojis()[0].id, id);
    }

    /// Apply `intent`, then check that undo restores the old state and redo
    /// the new one.
    fn assert_reversible(
        document: &mut EmojiArtDocument,
        name: &str,
        intent: impl FnOnce(&mut EmojiArtDocument),
    ) {
        let before = document.emoji_art().clone();
        intent(document);
        let after = document.emoji_art().clone();
        assert_ne!(before, after, "{name} changed nothing");
        assert_eq!(document.undo_action_name(), Some(name));

        assert!(document.undo());
        assert_eq!(document.emoji_art(), &before, "undo of {name}");
        assert!(document.redo());
        assert_eq!(document.emoji_art(), &after, "redo of {name}");
        assert!(document.undo());
    }

    #[test]
    fn test_undo_each_intent() {
        let (_, mut document) = memory_document();
        let fire = document.add_emoji("🔥", Position::new(200, 100), 80.0);
        document.add_emoji("🚲", Position::new(-200, -150), 200.0);
        document.add_emoji("🌈", Position::new(0, 50), 60.0);
        let url = Url::parse("https://example.com/bg.jpg").unwrap();

        assert_reversible(&mut document, "Move", |d| {
            d.update_emoji_position(fire, Position::new(5, 5))
        });
        assert_reversible(&mut document, "Resize", |d| d.update_emoji_size(fire, 160.0));
        assert_reversible(&mut document, "Delete Emoji", |d| d.delete_emoji(fire));
        assert_reversible(&mut document, "Set Background", |d| {
            d.set_background(Some(url))
        });
        assert_reversible(&mut document, "Add Emoji", |d| {
            d.add_emoji("🐢", Position::ZERO, 20.0);
        });
    }

    #[test]
    fn test_undo_delete_restores_index_and_id() {
        let (_, mut document) = memory_document();
        document.add_emoji("A", Position::ZERO, 10.0);
        let b = document.add_emoji("B", Position::ZERO, 10.0);
        document.add_emoji("C", Position::ZERO, 10.0);

        document.delete_emoji(b);
        document.undo();
        let order: Vec<_> = document.emojis().iter().map(|e| e.string.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(document.emojis()[1].id, b);
    }

    #[test]
    fn test_miss_registers_nothing() {
        let (storage, mut document) = memory_document();
        document.update_emoji_position(9, Position::ZERO);
        document.update_emoji_size(9, 10.0);
        document.delete_emoji(9);
        document.flush();

        assert!(!document.can_undo());
        assert!(!storage.exists(DEFAULT_AUTOSAVE_KEY).unwrap());
    }

    #[test]
    fn test_new_intent_clears_redo() {
        let (_, mut document) = memory_document();
        document.add_emoji("A", Position::ZERO, 10.0);
        document.undo();
        assert!(document.can_redo());
        document.add_emoji("B", Position::ZERO, 10.0);
        assert!(!document.can_redo());
    }

    #[test]
    fn test_ids_stay_unique_through_undo() {
        let (_, mut document) = memory_document();
        let first = document.add_emoji("A", Position::ZERO, 10.0);
        document.undo();
        let second = document.add_emoji("B", Position::ZERO, 10.0);
        assert_ne!(first, second);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let (storage, mut document) = memory_document();
        let id = document.add_emoji("🔥", Position::new(200, 100), 80.0);
        document.update_emoji_size(id, 160.0);
        document.flush();
        assert_eq!(&stored(&storage), document.emoji_art());

        document.undo();
        document.flush();
        assert_eq!(stored(&storage).emojis()[0].size, 80);
    }

    #[test]
    fn test_reload_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let id = {
            let mut document =
                EmojiArtDocument::with_storage(storage.clone(), DocumentConfig::default());
            let id = document.add_emoji("🚀", Position::new(1, 2), 50.0);
            document.set_background(Some(Url::parse("https://example.com/moon.png").unwrap()));
            id
        };

        let mut reopened = EmojiArtDocument::with_storage(storage, DocumentConfig::default());
        assert_eq!(reopened.emojis()[0].id, id);
        assert!(reopened.background().is_some());
        assert!(!reopened.can_undo());
        assert_eq!(reopened.add_emoji("🛩️", Position::ZERO, 40.0), id + 1);
    }

    #[test]
    fn test_corrupt_autosave_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(DEFAULT_AUTOSAVE_KEY, b"{\"emojis\": [{").unwrap();
        let document = EmojiArtDocument::with_storage(storage, DocumentConfig::default());
        assert_eq!(document.emoji_art(), &EmojiArt::new());
    }

    #[test]
    fn test_observers_see_each_change() {
        let (_, mut document) = memory_document();
        let counts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counts);
        let subscription = document.subscribe(move |art| sink.lock().unwrap().push(art.len()));

        let id = document.add_emoji("A", Position::ZERO, 10.0);
        document.add_emoji("B", Position::ZERO, 10.0);
        document.delete_emoji(id);
        document.delete_emoji(id);
        document.undo();

        assert!(document.unsubscribe(subscription));
        document.add_emoji("C", Position::ZERO, 10.0);

        assert_eq!(*counts.lock().unwrap(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_undo_limit_from_config() {
        let storage = Arc::new(MemoryStorage::new());
        let config = DocumentConfig {
            undo_limit: 2,
            ..DocumentConfig::default()
        };
        let mut document = EmojiArtDocument::with_storage(storage, config);
        for _ in 0..5 {
            document.add_emoji("A", Position::ZERO, 10.0);
        }
        assert!(document.undo());
        assert!(document.undo());
        assert!(!document.undo());
        assert_eq!(document.emojis().len(), 3);
    }

    #[test]
    fn test_with_undo_manager() {
        let (_, document) = memory_document();
        let document = document.with_undo_manager(UndoManager::with_limit(7));
        assert_eq!(document.undo_manager().limit(), 7);
    }

    #[test]
    fn test_stale_history_changes_nothing() {
        let (storage, document) = memory_document();
        let mut history = UndoManager::new();
        history.register(
            "Move",
            Edit::Move {
                id: 42,
                position: Position::ZERO,
            },
        );
        let mut document = document.with_undo_manager(history);
        let notified = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&notified);
        document.subscribe(move |_| *sink.lock().unwrap() += 1);

        assert!(!document.undo());
        assert!(!document.can_undo());
        assert!(!document.can_redo());
        document.flush();

        assert_eq!(*notified.lock().unwrap(), 0);
        assert!(!storage.exists(DEFAULT_AUTOSAVE_KEY).unwrap());
        assert_eq!(document.emoji_art(), &EmojiArt::new());
    }
}
