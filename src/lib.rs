// src/lib.rs
//
// smartquotes: convert straight quotes to curly quotes in (X)HTML, and check them.
//
// - Straight ' and " become ‘ ’ “ ” depending on whether they follow whitespace.
// - Ambiguous apostrophes, unmatched quotes/brackets, odd spacing and deep nesting are
//   flagged with marks inserted into the text (`*` for apostrophes, `#` for the rest).
// - Everything else is echoed byte for byte.
//
// NOT IMPLEMENTED: <q> elements are ignored, <pre> is one big paragraph, and <br> (even
// several in a row) does not break a paragraph.

pub mod config;
pub mod counters;
pub mod engine;
pub mod entities;
pub mod error;
pub mod glyph;
pub mod output;
pub mod punctuation;
pub mod report;
pub mod tokenizer;
pub mod window;

use std::io::Write;

use encoding_rs::UTF_8;

pub use config::{Checks, Config};
pub use counters::Counters;
pub use engine::Engine;
pub use error::{Error, Result};
pub use report::Report;
pub use tokenizer::{MarkupHandler, Tokenizer};

/// Check one decoded document, writing the result to `writer`.
pub fn process<W: Write>(config: &Config, input: &str, writer: W) -> Result<(W, Counters)> {
    let mut engine = Engine::new(config, writer);
    Tokenizer::new(input)
        .raw_text_elements(&config.invisible_elements)
        .run(&mut engine)?;
    engine.finish()
}

/// Check one raw document in the configured encoding.
///
/// A byte order mark is kept as an ordinary character so the output still matches the
/// input. Input that does not decode cleanly is an error, never silently replaced.
/// Characters the encoding cannot represent come out as numeric references.
pub fn process_bytes(config: &Config, input: &[u8]) -> Result<(Vec<u8>, Counters)> {
    let text = config
        .encoding
        .decode_without_bom_handling_and_without_replacement(input)
        .ok_or(Error::Decode(config.encoding.name()))?;

    let out = Vec::with_capacity(input.len() + input.len() / 20 + 64);
    let (out, counters) = process(config, &text, out)?;
    if config.encoding == UTF_8 {
        return Ok((out, counters));
    }

    let text = String::from_utf8_lossy(&out);
    let (bytes, _, _) = config.encoding.encode(&text);
    Ok((bytes.into_owned(), counters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bytes_round_trip() {
        let src = "\u{FEFF}<p>It's fine</p>".as_bytes();
        let (out, counters) = process_bytes(&Config::default(), src).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\u{FEFF}<p>It’s fine</p>");
        assert_eq!(counters.straight_single, 1);
    }

    #[test]
    fn windows_1252_round_trip() {
        let config = Config::default().with_encoding_label("windows-1252").unwrap();
        // é in Latin-1, then a straight apostrophe.
        let src = b"<p>caf\xe9's \xe2\x82</p>";
        let (out, _) = process_bytes(&config, src).unwrap();
        // ’ is 0x92 in windows-1252.
        assert_eq!(out, b"<p>caf\xe9\x92s \xe2\x82</p>".to_vec());
    }

    #[test]
    fn unmappable_characters_become_references() {
        let config = Config::default().with_encoding_label("iso-8859-2").unwrap();
        let (out, _) = process_bytes(&config, b"<p>'a'</p>").unwrap();
        // ISO-8859-2 has no curly quotes.
        assert_eq!(out, b"<p>&#8216;a&#8217;* *</p>".to_vec());
    }

    #[test]
    fn undecodable_input_is_an_error() {
        let err = process_bytes(&Config::quiet(), b"<p>caf\xe9 ok</p>").unwrap_err();
        assert!(matches!(err, Error::Decode("UTF-8")));

        // The same bytes are fine once the encoding is right.
        let config = Config::quiet().with_encoding_label("latin1").unwrap();
        let (out, _) = process_bytes(&config, b"<p>caf\xe9 ok</p>").unwrap();
        assert_eq!(out, b"<p>caf\xe9 ok</p>".to_vec());
    }

    #[test]
    fn malformed_markup_aborts() {
        let err = process(&Config::default(), "<p>text <!-- never closed", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Markup { offset: 8, .. }));
    }
}
