//! Emoji palettes offered for dragging onto the canvas.
//!
//! A palette is a named string of unique emoji. A [`PaletteStore`] keeps an
//! ordered, never-empty list of palettes with a cursor on the one currently
//! shown, and persists it through a [`Storage`] backend.

use crate::storage::{Storage, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

/// Whether `c` continues the glyph before it rather than starting a new one.
fn is_glyph_extender(c: char) -> bool {
    matches!(c,
        '\u{FE00}'..='\u{FE0F}'       // variation selectors
        | '\u{1F3FB}'..='\u{1F3FF}'   // skin tones
        | '\u{E0020}'..='\u{E007F}'   // tags
        | '\u{0300}'..='\u{036F}'     // combining marks
        | KEYCAP
        | ZERO_WIDTH_JOINER)
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

/// Split a string into user-visible glyphs.
///
/// Handles the sequences emoji are built from (variation selectors, skin
/// tones, ZWJ sequences, keycaps, flag pairs); it is not a full grapheme
/// segmenter.
pub fn glyphs(s: &str) -> Vec<&str> {
    let mut glyphs = Vec::new();
    let mut start = None;
    let mut previous: Option<char> = None;
    let mut flag_half = false;

    for (index, c) in s.char_indices() {
        let joins = match previous {
            None => false,
            Some(ZERO_WIDTH_JOINER) => true,
            Some(p) if is_regional_indicator(p) && is_regional_indicator(c) => flag_half,
            _ => is_glyph_extender(c),
        };
        if !joins {
            if let Some(begin) = start {
                glyphs.push(&s[begin..index]);
            }
            start = Some(index);
            flag_half = is_regional_indicator(c);
        } else if is_regional_indicator(c) {
            flag_half = false;
        }
        previous = Some(c);
    }
    if let Some(begin) = start {
        glyphs.push(&s[begin..]);
    }
    glyphs
}

/// Whether a glyph renders as an emoji.
pub fn is_emoji(glyph: &str) -> bool {
    let mut chars = glyph.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let multi_scalar = chars.next().is_some();
    if multi_scalar
        && glyph
            .chars()
            .any(|c| matches!(c, VARIATION_SELECTOR_16 | KEYCAP | ZERO_WIDTH_JOINER))
    {
        return true;
    }
    matches!(first,
        '\u{1F000}'..='\u{1FAFF}'
        | '\u{2600}'..='\u{27BF}'
        | '\u{238D}'..='\u{23FF}'
        | '\u{2B05}'..='\u{2B55}'
        | '\u{2934}' | '\u{2935}'
        | '\u{3030}' | '\u{303D}' | '\u{3297}' | '\u{3299}')
}

/// Keep only emoji glyphs, dropping repeats after their first occurrence.
pub fn unique_emojis(s: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for glyph in glyphs(s) {
        if is_emoji(glyph) && !seen.contains(&glyph) {
            seen.push(glyph);
        }
    }
    seen.concat()
}

/// A named set of emoji.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub emojis: String,
    pub id: Uuid,
}

impl Palette {
    /// Create a palette, keeping only unique emoji from `emojis`.
    pub fn new(name: impl Into<String>, emojis: &str) -> Self {
        Self {
            name: name.into(),
            emojis: unique_emojis(emojis),
            id: Uuid::new_v4(),
        }
    }

    /// The palette's emoji as individual glyphs.
    pub fn glyphs(&self) -> Vec<&str> {
        glyphs(&self.emojis)
    }

    /// Put new emoji in front of the existing ones. Non-emoji and repeats are
    /// dropped.
    pub fn add_emojis(&mut self, emojis: &str) {
        self.emojis = unique_emojis(&format!("{}{}", emojis, self.emojis));
    }

    /// Remove one glyph. Returns false if it was not in the palette.
    pub fn remove_emoji(&mut self, emoji: &str) -> bool {
        let glyphs = glyphs(&self.emojis);
        if !glyphs.contains(&emoji) {
            return false;
        }
        self.emojis = glyphs.into_iter().filter(|glyph| *glyph != emoji).collect();
        true
    }

    /// Palettes shipped with the app.
    pub fn builtins() -> Vec<Palette> {
        vec![
            Palette::new("Vehicles", "🚗🚙🚓🚲🛺🏍️🚘✈️🛩️🚀🚁⛵️"),
            Palette::new("Animals", "🐶🐭🦁🐵🦆🐝🐢🐄🐖"),
            Palette::new("Faces", "😃🤪☹️🤯👻"),
            Palette::new("Flora", "🌲🌴🌵🍄🍎"),
            Palette::new("Weather", "🌞🌎🔥🌈🌧️🌨️☁️⛄️"),
            Palette::new("Places", "⛳️🏰🏠❤️💤"),
        ]
    }
}

/// Ordered, persistent collection of palettes.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteStore {
    name: String,
    palettes: Vec<Palette>,
    cursor_index: usize,
}

impl PaletteStore {
    /// Create a store seeded with the built-in palettes.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_palettes(name, Palette::builtins())
    }

    /// Create a store from `palettes`; an empty list gets a placeholder
    /// palette so the store is never empty.
    pub fn with_palettes(name: impl Into<String>, mut palettes: Vec<Palette>) -> Self {
        if palettes.is_empty() {
            palettes.push(Palette::new("Warning", "⚠️"));
        }
        Self {
            name: name.into(),
            palettes,
            cursor_index: 0,
        }
    }

    fn storage_key(name: &str) -> String {
        format!("palettes-{}", name)
    }

    /// Load the store named `name`, or seed it with the built-ins if nothing
    /// usable is stored.
    pub fn load(storage: &dyn Storage, name: &str) -> Self {
        let key = Self::storage_key(name);
        let palettes = match storage.load(&key) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Palette>>(&bytes) {
                Ok(palettes) => palettes,
                Err(e) => {
                    log::warn!("Discarding unreadable palettes '{}': {}", key, e);
                    return Self::new(name);
                }
            },
            Err(StorageError::NotFound(_)) => return Self::new(name),
            Err(e) => {
                log::warn!("Failed to read palettes '{}': {}", key, e);
                return Self::new(name);
            }
        };
        Self::with_palettes(name, palettes)
    }

    /// Persist the palettes.
    pub fn save(&self, storage: &dyn Storage) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.palettes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        storage.save(&Self::storage_key(&self.name), &bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor_index
    }

    /// Move the cursor. Out-of-range indices wrap around in both directions.
    pub fn set_cursor_index(&mut self, index: isize) {
        self.cursor_index = self.bounds_checked_index(index);
    }

    /// The palette under the cursor.
    pub fn current(&self) -> &Palette {
        &self.palettes[self.cursor_index]
    }

    pub fn current_mut(&mut self) -> &mut Palette {
        &mut self.palettes[self.cursor_index]
    }

    fn bounds_checked_index(&self, index: isize) -> usize {
        let count = self.palettes.len() as isize;
        index.rem_euclid(count) as usize
    }

    /// Whether `palette` stands for an entry already in the store: same id
    /// or the same emoji.
    fn matches(existing: &Palette, palette: &Palette) -> bool {
        existing.id == palette.id || existing.emojis == palette.emojis
    }

    /// Insert at `index` (default: the cursor). A palette with the same id
    /// or the same emoji is moved there and replaced.
    pub fn insert(&mut self, palette: Palette, index: Option<isize>) {
        let index = self.bounds_checked_index(index.unwrap_or(self.cursor_index as isize));
        self.palettes.retain(|p| !Self::matches(p, &palette));
        let index = index.min(self.palettes.len());
        self.palettes.insert(index, palette);
        self.cursor_index = self.cursor_index.min(self.palettes.len() - 1);
    }

    /// Append at the end. A palette with the same id or the same emoji is
    /// moved there and replaced.
    pub fn append(&mut self, palette: Palette) {
        self.palettes.retain(|p| !Self::matches(p, &palette));
        self.palettes.push(palette);
        self.cursor_index = self.cursor_index.min(self.palettes.len() - 1);
    }

    /// Remove the palette at `index`. The last remaining palette is never
    /// removed. The cursor stays on the same palette when possible.
    pub fn remove(&mut self, index: usize) -> Option<Palette> {
        if self.palettes.len() <= 1 || index >= self.palettes.len() {
            return None;
        }
        let removed = self.palettes.remove(index);
        if index < self.cursor_index {
            self.cursor_index -= 1;
        } else if self.cursor_index >= self.palettes.len() {
            self.cursor_index = self.palettes.len() - 1;
        }
        Some(removed)
    }
}
