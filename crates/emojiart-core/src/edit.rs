//! Reversible edits of an [`EmojiArt`].

use crate::emoji_art::{Emoji, EmojiArt, EmojiId, Position};
use url::Url;

/// A single reversible change to a document.
///
/// Applying an edit returns the edit that undoes it, which is what the undo
/// history stores.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    SetBackground(Option<Url>),
    /// Re-insert a removed emoji at its old index, keeping its id.
    Insert { index: usize, emoji: Emoji },
    Delete(EmojiId),
    Move { id: EmojiId, position: Position },
    Resize { id: EmojiId, size: u32 },
}

impl Edit {
    /// Apply to `art`. Returns the inverse, or `None` if the edit targeted an
    /// emoji that no longer exists and nothing changed.
    pub fn apply(self, art: &mut EmojiArt) -> Option<Edit> {
        match self {
            Edit::SetBackground(background) => {
                Some(Edit::SetBackground(art.set_background(background)))
            }
            Edit::Insert { index, emoji } => {
                let id = emoji.id;
                art.restore_emoji(emoji, index).then_some(Edit::Delete(id))
            }
            Edit::Delete(id) => art
                .delete_emoji(id)
                .map(|(index, emoji)| Edit::Insert { index, emoji }),
            Edit::Move { id, position } => art
                .update_emoji_position(id, position)
                .map(|position| Edit::Move { id, position }),
            Edit::Resize { id, size } => art
                .update_emoji_size(id, size)
                .map(|size| Edit::Resize { id, size }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_inverse() {
        let mut art = EmojiArt::new();
        let id = art.add_emoji("🦆", Position::new(1, 1), 40);
        let inverse = Edit::Move { id, position: Position::new(9, 9) }.apply(&mut art);
        assert_eq!(inverse, Some(Edit::Move { id, position: Position::new(1, 1) }));
        assert_eq!(art.emoji(id).unwrap().position, Position::new(9, 9));
    }

    #[test]
    fn test_delete_inverse_restores_index() {
        let mut art = EmojiArt::new();
        art.add_emoji("A", Position::ZERO, 10);
        let b = art.add_emoji("B", Position::ZERO, 10);
        art.add_emoji("C", Position::ZERO, 10);
        let before = art.clone();

        let inverse = Edit::Delete(b).apply(&mut art).unwrap();
        assert_eq!(art.len(), 2);
        let redo = inverse.apply(&mut art).unwrap();
        assert_eq!(art, before);
        assert_eq!(redo, Edit::Delete(b));
    }

    #[test]
    fn test_missing_target_has_no_inverse() {
        let mut art = EmojiArt::new();
        assert_eq!(Edit::Delete(3).apply(&mut art), None);
        assert_eq!(Edit::Resize { id: 3, size: 10 }.apply(&mut art), None);
        assert_eq!(Edit::Move { id: 3, position: Position::ZERO }.apply(&mut art), None);
        assert_eq!(art, EmojiArt::new());
    }

    #[test]
    fn test_background_inverse() {
        let mut art = EmojiArt::new();
        let url = Url::parse("file:///tmp/bg.png").unwrap();
        let inverse = Edit::SetBackground(Some(url)).apply(&mut art).unwrap();
        assert_eq!(inverse, Edit::SetBackground(None));
        inverse.apply(&mut art);
        assert!(art.background().is_none());
    }
}
