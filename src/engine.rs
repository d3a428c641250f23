// src/engine.rs
//
// The quote checker proper. Consumes tokenizer events one at a time and echoes them,
// rewriting straight quotes and inserting marks as it goes.
//
// - Text is classified into glyphs (see `glyph`): whitespace runs collapse to one Space,
//   paragraph elements insert a Paragraph.
// - Each new glyph is "incoming"; the decision is taken about the glyph before it
//   ("current"), knowing the one before that ("previous"). Marks for "current" are
//   written before the incoming glyph's text and before any tags buffered since.
// - A closing single quote that might be an apostrophe only tentatively closes a quote.
//   Those guesses are resolved at the end of the paragraph, or earlier when a mismatch
//   shows the apostrophes must have been closing quotes.
// - After a genuine mismatch the stack is left alone until the next paragraph. Later
//   diagnostics in the same paragraph may cascade from it.

use std::io::Write;

use crate::config::Config;
use crate::counters::Counters;
use crate::error::Result;
use crate::glyph::{Glyph, Punct, LEFT_DOUBLE, LEFT_SINGLE, RIGHT_DOUBLE, RIGHT_SINGLE};
use crate::output::OutputWriter;
use crate::punctuation::{CloseError, PunctuationStack};
use crate::tokenizer::MarkupHandler;
use crate::window::HistoryWindow;

pub struct Engine<'c, W: Write> {
    config: &'c Config,
    counters: Counters,
    out: OutputWriter<W>,
    window: HistoryWindow,
    stack: PunctuationStack,
    /// Depth of nested invisible elements.
    hidden: usize,
}

impl<'c, W: Write> Engine<'c, W> {
    pub fn new(config: &'c Config, writer: W) -> Self {
        Self {
            config,
            counters: Counters::default(),
            out: OutputWriter::new(writer),
            window: HistoryWindow::new(),
            stack: PunctuationStack::new(),
            hidden: 0,
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn stack(&self) -> &PunctuationStack {
        &self.stack
    }

    /// Flush whatever is still buffered and hand back the writer and the tallies.
    pub fn finish(self) -> Result<(W, Counters)> {
        log::debug!("document finished: {:?}", self.counters);
        let writer = self.out.finish()?;
        Ok((writer, self.counters))
    }

    /* ============================== Marks ================================ */

    fn mark_if(&mut self, enabled: bool, text: &str) -> Result<()> {
        if enabled {
            self.out.mark(text)?;
        }
        Ok(())
    }

    fn spacing_defect(&mut self, unexpected_space: bool) -> Result<()> {
        if unexpected_space {
            self.counters.spaced_quotes += 1;
        } else {
            self.counters.unspaced_quotes += 1;
        }
        let config = self.config;
        self.mark_if(config.checks.spacing, &config.warn)
    }

    /* ======================== Glyph classification ======================= */

    /// Take `glyph` as the incoming character and decide about the current one.
    /// Returns the curly quote a straight quote was rewritten to, if any.
    fn advance(&mut self, glyph: Glyph) -> Result<Option<char>> {
        let mut glyph = glyph;
        let mut rewritten = None;

        if !self.config.ignore_straight_quotes {
            // Could be an opening quote OR a leading apostrophe after a space. We assume
            // the quote; if that is wrong it should show up as a mismatch later.
            let opening = self.window.incoming().is_breakspace();
            let curly = match glyph {
                Glyph::Char('\'') => {
                    self.counters.straight_single += 1;
                    Some(if opening { LEFT_SINGLE } else { RIGHT_SINGLE })
                }
                Glyph::Char('"') => {
                    self.counters.straight_double += 1;
                    Some(if opening { LEFT_DOUBLE } else { RIGHT_DOUBLE })
                }
                _ => None,
            };
            if let Some(q) = curly {
                glyph = Glyph::Char(q);
                rewritten = Some(q);
            }
        }

        self.window.push(glyph);
        self.classify_current()?;
        Ok(rewritten)
    }

    fn classify_current(&mut self) -> Result<()> {
        let prev = self.window.previous();
        let cur = self.window.current();
        let next = self.window.incoming();

        match cur.punct() {
            Punct::OpenParen => self.open('(', ')'),
            Punct::CloseParen => self.close(')'),
            Punct::OpenBracket => self.open('[', ']'),
            Punct::CloseBracket => self.close(']'),
            Punct::OpenDouble => {
                self.check_opening_spacing(prev, next)?;
                self.open(LEFT_DOUBLE, RIGHT_DOUBLE)
            }
            Punct::CloseDouble => {
                self.check_closing_spacing(prev, next)?;
                self.close(RIGHT_DOUBLE)
            }
            Punct::OpenSingle => {
                self.counters.open_quotes += 1;
                self.check_opening_spacing(prev, next)?;
                self.open(LEFT_SINGLE, RIGHT_SINGLE)
            }
            Punct::Apostrophe => self.apostrophe(prev, next),
            Punct::Other => Ok(()),
        }
    }

    fn check_opening_spacing(&mut self, prev: Glyph, next: Glyph) -> Result<()> {
        if prev.is_alphanumeric() {
            self.spacing_defect(false)?;
        }
        if next.is_breakspace() {
            self.spacing_defect(true)?;
        }
        Ok(())
    }

    fn check_closing_spacing(&mut self, prev: Glyph, next: Glyph) -> Result<()> {
        if prev.is_breakspace() {
            self.spacing_defect(true)?;
        }
        if next.is_alphanumeric() {
            self.spacing_defect(false)?;
        }
        Ok(())
    }

    /// The current glyph is ’, which is both the apostrophe and the closing single quote.
    fn apostrophe(&mut self, prev: Glyph, next: Glyph) -> Result<()> {
        let config = self.config;

        if prev.is_alphanumeric() {
            if next.is_alphabetic() {
                // Internal, must be an apostrophe.
                return Ok(());
            }
            // End of word: apostrophe OR closing quote.
            self.counters.ambiguous_apostrophes += 1;
            return self.maybe_close(RIGHT_SINGLE);
        }

        if next.is_alphanumeric() {
            // Start of word. Could be a wrongly-angled opening quote, and there are
            // usually not too many of these to check.
            self.counters.leading_apostrophes += 1;
            let enabled = config.checks.apostrophe && !config.skip_leading_apostrophes;
            return self.mark_if(enabled, &config.mark);
        }

        // Not attached to a word: must be a closing quote.
        if prev.is_breakspace() {
            self.spacing_defect(true)?;
        }
        self.counters.close_quotes += 1;
        self.close(RIGHT_SINGLE)
    }

    /* ========================= Punctuation stack ========================= */

    fn open(&mut self, open: char, close: char) -> Result<()> {
        let config = self.config;
        let same = self.stack.open(open, close);
        if same > 1 {
            self.counters.same_quotes += 1;
            self.mark_if(
                config.checks.nesting && !config.allow_same_quotes,
                &config.warn,
            )?;
        }

        let depth = self.stack.depth();
        if depth > config.max_depth {
            self.counters.too_deep += 1;
            if config.checks.nesting {
                self.out.mark(&format!("{}[{depth}]", config.warn))?;
            }
        }
        Ok(())
    }

    fn close(&mut self, close: char) -> Result<()> {
        match self.stack.close(close) {
            Ok(()) => Ok(()),
            Err(CloseError::EmptyStack) => {
                if close == RIGHT_SINGLE {
                    self.counters.unmatched_quotes += 1;
                } else {
                    self.counters.unmatched += 1;
                }
                let config = self.config;
                self.mark_if(config.checks.mismatch, &config.warn)
            }
            Err(CloseError::Mismatch) => self.mismatch(close),
        }
    }

    fn mismatch(&mut self, close: char) -> Result<()> {
        let config = self.config;
        let (top, second) = match (self.stack.top(), self.stack.second()) {
            (Some(top), second) => (*top, second.copied()),
            (None, _) => return Ok(()),
        };

        if second.is_some_and(|s| s.close == close) && top.is_speculative() {
            // The apostrophes we noted must have been closing quotes after all.
            let resolved = self.stack.close_speculative();
            self.mark_if(config.checks.apostrophe, &format!(" {}", config.mark.repeat(resolved)))?;
            return self.close(close);
        }

        if config.checks.mismatch {
            self.out.mark(&format!("{}[{}]", config.warn, top.open))?;
        }
        if close == RIGHT_SINGLE || top.open == LEFT_SINGLE {
            self.counters.unmatched_quotes += 1;
        } else {
            self.counters.unmatched += 1;
        }
        Ok(())
    }

    fn maybe_close(&mut self, close: char) -> Result<()> {
        let config = self.config;
        self.mark_if(config.checks.apostrophe, &config.mark)?;
        self.stack.maybe_close(close);
        Ok(())
    }

    /// Punctuation never nests across paragraphs: resolve or report everything still open.
    fn end_of_paragraph(&mut self) -> Result<()> {
        let config = self.config;

        // Some of the apostrophes might have been closing quotes, so close as many.
        let resolved = self.stack.close_speculative();
        if resolved > 0 {
            self.mark_if(config.checks.apostrophe, &format!(" {}", config.mark.repeat(resolved)))?;
        }

        if self.stack.is_empty() {
            return Ok(());
        }

        let frames = self.stack.clear();
        let opens: String = frames.iter().map(|f| f.open).collect();
        log::trace!("paragraph ended with unmatched {opens:?}");

        // Anything already reported as a mismatch in this paragraph is counted again here.
        for frame in &frames {
            if frame.open == LEFT_SINGLE {
                self.counters.unmatched_quotes += 1;
            } else {
                self.counters.unmatched += 1;
            }
        }
        if config.checks.mismatch {
            self.out.mark(&format!(" {}[{opens}]", config.warn))?;
        }
        Ok(())
    }

    fn paragraph_break(&mut self) -> Result<()> {
        self.advance(Glyph::Paragraph)?;
        self.end_of_paragraph()
    }
}

impl<W: Write> MarkupHandler for Engine<'_, W> {
    fn start_element(&mut self, name: &str, raw: &str) -> Result<()> {
        if self.config.is_invisible_element(name) {
            self.hidden += 1;
        }
        if self.config.is_paragraph_element(name) {
            self.paragraph_break()?;
        }
        self.out.save_token(raw);
        Ok(())
    }

    fn end_element(&mut self, name: &str, raw: &str) -> Result<()> {
        if self.config.is_invisible_element(name) {
            self.hidden = self.hidden.saturating_sub(1);
        }
        if self.config.is_paragraph_element(name) {
            self.paragraph_break()?;
        }
        self.out.save_token(raw);
        Ok(())
    }

    fn empty_element(&mut self, name: &str, raw: &str) -> Result<()> {
        if self.config.is_paragraph_element(name) {
            self.paragraph_break()?;
        }
        self.out.save_token(raw);
        Ok(())
    }

    fn character_data(&mut self, c: char, raw: &str) -> Result<()> {
        let mut rewritten = None;

        if self.hidden == 0 {
            let glyph = Glyph::classify(c);
            let collapsed = glyph == Glyph::Space
                && matches!(self.window.incoming(), Glyph::Space | Glyph::Paragraph);
            if !collapsed {
                rewritten = self.advance(glyph)?;
            }
        }

        match rewritten {
            Some(q) => self.out.flush(q.encode_utf8(&mut [0; 4]))?,
            None => self.out.flush(raw)?,
        }
        Ok(())
    }

    fn noncharacter_data(&mut self, raw: &str) -> Result<()> {
        self.out.save_token(raw);
        Ok(())
    }

    fn end_of_document(&mut self) -> Result<()> {
        self.paragraph_break()
    }
}
