//! Property tests for the punctuation stack invariants and the echo guarantee

use proptest::prelude::*;
use smartquotes::{process, Config, Counters, Engine, MarkupHandler, Result, Tokenizer};

/// Delegates to an engine and checks the stack after every event.
struct Checked<'c> {
    engine: Engine<'c, Vec<u8>>,
    config: &'c Config,
}

impl Checked<'_> {
    fn assert_frames(&self) {
        let frames = self.engine.stack().frames();
        for frame in frames {
            assert!(frame.committed > 0, "{frame:?}");
            assert!(frame.speculative <= frame.committed, "{frame:?}");
        }
        for pair in frames.windows(2) {
            assert_ne!(pair[0].open, pair[1].open, "{frames:?}");
        }
    }

    fn assert_drained(&self, name: &str) {
        if self.config.is_paragraph_element(name) {
            assert!(self.engine.stack().is_empty(), "stack survived <{name}>");
        }
    }
}

impl MarkupHandler for Checked<'_> {
    fn start_element(&mut self, name: &str, raw: &str) -> Result<()> {
        self.engine.start_element(name, raw)?;
        self.assert_drained(name);
        self.assert_frames();
        Ok(())
    }
    fn end_element(&mut self, name: &str, raw: &str) -> Result<()> {
        self.engine.end_element(name, raw)?;
        self.assert_drained(name);
        self.assert_frames();
        Ok(())
    }
    fn empty_element(&mut self, name: &str, raw: &str) -> Result<()> {
        self.engine.empty_element(name, raw)?;
        self.assert_drained(name);
        self.assert_frames();
        Ok(())
    }
    fn character_data(&mut self, c: char, raw: &str) -> Result<()> {
        self.engine.character_data(c, raw)?;
        self.assert_frames();
        Ok(())
    }
    fn noncharacter_data(&mut self, raw: &str) -> Result<()> {
        self.engine.noncharacter_data(raw)?;
        self.assert_frames();
        Ok(())
    }
    fn end_of_document(&mut self) -> Result<()> {
        self.engine.end_of_document()?;
        assert!(self.engine.stack().is_empty());
        Ok(())
    }
}

/// Documents built from the pieces the checker cares about.
fn document() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "'",
        "\"",
        "‘",
        "’",
        "“",
        "”",
        "(",
        ")",
        "[",
        "]",
        " ",
        "\n",
        "\u{A0}",
        "a",
        "word",
        "7",
        ".",
        "<p>",
        "</p>",
        "<em>",
        "</em>",
        "<hr/>",
        "<br/>",
        "<!-- c -->",
        "&apos;",
        "&#8217;",
    ]);
    prop::collection::vec(piece, 0..60).prop_map(|pieces| pieces.concat())
}

fn check(config: &Config, src: &str) -> (String, Counters) {
    let (out, counters) = process(config, src, Vec::new()).unwrap();
    (String::from_utf8(out).unwrap(), counters)
}

proptest! {
    #[test]
    fn stack_invariants_hold(src in document()) {
        let config = Config::default();
        let mut checked = Checked { engine: Engine::new(&config, Vec::new()), config: &config };
        Tokenizer::new(&src)
            .raw_text_elements(&config.invisible_elements)
            .run(&mut checked)
            .unwrap();
    }

    #[test]
    fn quiet_run_echoes_input(src in document()) {
        let (out, _) = check(&Config::quiet(), &src);
        prop_assert_eq!(out, src);
    }

    #[test]
    fn conversion_is_idempotent(src in document()) {
        let config = Config::default();
        let (once, _) = check(&config, &src);
        let (_, counters) = check(&config, &once);
        prop_assert_eq!(counters.straight_quotes(), 0);
    }
}

