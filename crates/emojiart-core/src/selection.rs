//! Selection state held by the view layer.

use crate::document::EmojiId;
use std::collections::HashSet;

/// The set of selected emoji.
///
/// Selection belongs to the view, not the document: the document never
/// learns which emoji are selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<EmojiId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of an emoji. Returns true if it is now selected.
    pub fn toggle(&mut self, id: EmojiId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: EmojiId) -> bool {
        self.ids.contains(&id)
    }

    /// Drop an id from the selection. Returns true if it was selected.
    pub fn remove(&mut self, id: EmojiId) -> bool {
        self.ids.remove(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids as an owned list, for mutating the document while iterating.
    pub fn to_vec(&self) -> Vec<EmojiId> {
        self.ids.iter().copied().collect()
    }
}
