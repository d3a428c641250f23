// src/punctuation.rs
//
// Stack of the punctuation marks currently "open" within a paragraph, with a _limited_
// non-deterministic pop used for apostrophes which might be closing quotes.
//
// The stack only records state. Deciding what to report, and writing marks, is the
// engine's job.

/// One nesting level of a single kind of punctuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PunctuationFrame {
    /// Opening glyph.
    pub open: char,
    /// Glyph that closes it.
    pub close: char,
    /// How many times `open` has been seen at this level.
    pub committed: usize,
    /// How many of those may already have been closed by an ambiguous apostrophe.
    /// Always `<= committed`.
    pub speculative: usize,
}

impl PunctuationFrame {
    fn new(open: char, close: char) -> Self {
        Self {
            open,
            close,
            committed: 1,
            speculative: 0,
        }
    }

    /// Opens that are not speculatively closed.
    pub fn live(&self) -> usize {
        self.committed - self.speculative
    }

    pub fn is_speculative(&self) -> bool {
        self.speculative == self.committed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseError {
    /// Nothing is open.
    EmptyStack,
    /// The innermost open punctuation is closed by a different glyph.
    Mismatch,
}

#[derive(Clone, Debug, Default)]
pub struct PunctuationStack {
    frames: Vec<PunctuationFrame>,
}

impl PunctuationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[PunctuationFrame] {
        &self.frames
    }

    pub fn top(&self) -> Option<&PunctuationFrame> {
        self.frames.last()
    }

    /// The frame just below the top.
    pub fn second(&self) -> Option<&PunctuationFrame> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }

    /// Total live nesting depth.
    pub fn depth(&self) -> usize {
        self.frames.iter().map(PunctuationFrame::live).sum()
    }

    /// Push `open`, merging into the top frame if it was opened by the same glyph.
    /// Returns the top frame's live count afterwards.
    pub fn open(&mut self, open: char, close: char) -> usize {
        match self.frames.last_mut() {
            Some(top) if top.open == open => top.committed += 1,
            _ => self.frames.push(PunctuationFrame::new(open, close)),
        }
        self.frames.last().map_or(0, PunctuationFrame::live)
    }

    pub fn close(&mut self, close: char) -> Result<(), CloseError> {
        let top = self.frames.last_mut().ok_or(CloseError::EmptyStack)?;
        if top.close != close {
            return Err(CloseError::Mismatch);
        }

        top.committed -= 1;
        top.speculative = top.speculative.min(top.committed);
        if top.committed == 0 {
            self.frames.pop();
        }
        Ok(())
    }

    /// Record that `close` may have closed one more of the top frame's opens.
    pub fn maybe_close(&mut self, close: char) {
        if let Some(top) = self.frames.last_mut() {
            if top.close == close && top.speculative < top.committed {
                top.speculative += 1;
            }
        }
    }

    /// Treat the top frame's speculative closes as real ones. Returns how many there were.
    pub fn close_speculative(&mut self) -> usize {
        let Some(top) = self.frames.last_mut() else {
            return 0;
        };
        let resolved = top.speculative;
        top.committed -= resolved;
        top.speculative = 0;
        if top.committed == 0 {
            self.frames.pop();
        }
        resolved
    }

    /// Drop every frame, returning them innermost last.
    pub fn clear(&mut self) -> Vec<PunctuationFrame> {
        std::mem::take(&mut self.frames)
    }
}
