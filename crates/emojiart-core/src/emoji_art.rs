//! The EmojiArt document model.
//!
//! An [`EmojiArt`] is a background reference plus an ordered list of placed
//! [`Emoji`]. List order is back-to-front drawing order.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Identity of a placed emoji, unique within its document.
pub type EmojiId = u64;

/// Smallest size an emoji can have.
pub const MIN_EMOJI_SIZE: u32 = 1;

/// Error returned when persisted bytes are not a valid document.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Offset from the centre of the canvas. `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One emoji placed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Glyph content. Never validated here.
    pub string: String,
    pub position: Position,
    /// Font-size-like scale, at least [`MIN_EMOJI_SIZE`].
    pub size: u32,
    pub id: EmojiId,
}

/// A document: background plus placed emoji.
///
/// Equality compares the logical content (background and the ordered emoji
/// list) and ignores the private id counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "EmojiArtData")]
pub struct EmojiArt {
    background: Option<Url>,
    emojis: Vec<Emoji>,
    /// Last id handed out. Never decremented.
    #[serde(skip)]
    next_id: EmojiId,
}

/// Wire shape used for decoding; the id counter is rebuilt from it.
#[derive(Deserialize)]
struct EmojiArtData {
    #[serde(default)]
    background: Option<Url>,
    #[serde(default)]
    emojis: Vec<Emoji>,
}

impl From<EmojiArtData> for EmojiArt {
    fn from(data: EmojiArtData) -> Self {
        let mut emojis: Vec<Emoji> = Vec::with_capacity(data.emojis.len());
        for mut emoji in data.emojis {
            if emojis.iter().any(|kept| kept.id == emoji.id) {
                log::warn!("Dropping emoji with duplicate id {}", emoji.id);
                continue;
            }
            emoji.size = emoji.size.max(MIN_EMOJI_SIZE);
            emojis.push(emoji);
        }
        let next_id = emojis.iter().map(|emoji| emoji.id).max().unwrap_or(0);
        Self {
            background: data.background,
            emojis,
            next_id,
        }
    }
}

impl PartialEq for EmojiArt {
    fn eq(&self, other: &Self) -> bool {
        self.background == other.background && self.emojis == other.emojis
    }
}

impl Eq for EmojiArt {}

impl EmojiArt {
    /// Create an empty document with no background.
    pub fn new() -> Self {
        Self::default()
    }

    /// The background image reference, if any.
    pub fn background(&self) -> Option<&Url> {
        self.background.as_ref()
    }

    /// Placed emoji, back to front.
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// Get an emoji by ID.
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|emoji| emoji.id == id)
    }

    /// Index of an emoji in drawing order.
    pub fn index_of(&self, id: EmojiId) -> Option<usize> {
        self.emojis.iter().position(|emoji| emoji.id == id)
    }

    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }

    /// Replace the background. Returns the previous one.
    pub fn set_background(&mut self, background: Option<Url>) -> Option<Url> {
        std::mem::replace(&mut self.background, background)
    }

    /// Append a new emoji on top of all others and return its id.
    pub fn add_emoji(
        &mut self,
        string: impl Into<String>,
        position: Position,
        size: u32,
    ) -> EmojiId {
        self.next_id += 1;
        let id = self.next_id;
        self.emojis.push(Emoji {
            string: string.into(),
            position,
            size: size.max(MIN_EMOJI_SIZE),
            id,
        });
        id
    }

    /// Move an emoji. Returns the previous position, or `None` if no emoji
    /// has this id.
    pub fn update_emoji_position(&mut self, id: EmojiId, position: Position) -> Option<Position> {
        let emoji = self.emojis.iter_mut().find(|emoji| emoji.id == id)?;
        Some(std::mem::replace(&mut emoji.position, position))
    }

    /// Resize an emoji. Returns the previous size, or `None` if no emoji has
    /// this id.
    pub fn update_emoji_size(&mut self, id: EmojiId, size: u32) -> Option<u32> {
        let emoji = self.emojis.iter_mut().find(|emoji| emoji.id == id)?;
        Some(std::mem::replace(&mut emoji.size, size.max(MIN_EMOJI_SIZE)))
    }

    /// Remove every emoji with this id.
    ///
    /// Returns the removed record with the index it occupied, or `None` if
    /// nothing matched.
    pub fn delete_emoji(&mut self, id: EmojiId) -> Option<(usize, Emoji)> {
        let index = self.index_of(id)?;
        let removed = self.emojis.remove(index);
        self.emojis.retain(|emoji| emoji.id != id);
        Some((index, removed))
    }

    /// Put a previously removed emoji back at `index` (clamped to the end),
    /// keeping its id.
    ///
    /// Returns false and leaves the document alone if the id is already
    /// present.
    pub fn restore_emoji(&mut self, mut emoji: Emoji, index: usize) -> bool {
        if self.index_of(emoji.id).is_some() {
            return false;
        }
        emoji.size = emoji.size.max(MIN_EMOJI_SIZE);
        self.next_id = self.next_id.max(emoji.id);
        let index = index.min(self.emojis.len());
        self.emojis.insert(index, emoji);
        true
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize the document to JSON bytes, as written to storage.
    pub fn json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Decode a document previously produced by [`EmojiArt::json`].
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
