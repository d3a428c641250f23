// src/window.rs

use crate::glyph::Glyph;

/// Look-back history of three glyphs: `previous`, `current`, `incoming`.
///
/// Decisions about `current` are taken once `incoming` is known. The window starts out
/// full of paragraph breaks, so the start of a document behaves like the start of a
/// paragraph.
#[derive(Clone, Copy, Debug)]
pub struct HistoryWindow {
    slots: [Glyph; 3],
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self {
            slots: [Glyph::Paragraph; 3],
        }
    }

    /// Shift left by one and place `glyph` in the `incoming` slot.
    pub fn push(&mut self, glyph: Glyph) {
        self.slots = [self.slots[1], self.slots[2], glyph];
    }

    pub fn previous(&self) -> Glyph {
        self.slots[0]
    }

    pub fn current(&self) -> Glyph {
        self.slots[1]
    }

    pub fn incoming(&self) -> Glyph {
        self.slots[2]
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}
