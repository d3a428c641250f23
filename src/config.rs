// src/config.rs
//
// Run parameters. Built once by the driver and only read by the engine.

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};

/* =============================== Element sets ============================= */

// Flow content that is not phrasing content (display:block by default), plus table
// cells and list items. <pre> is here so at least its edges break paragraphs, even
// though its contents are treated as one big paragraph.
const PARAGRAPH_ELEMENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "hr", "td", "th", "li", "html",
    "title", "body", "div", "center", "section", "article", "aside", "pre",
];

// display:none
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style"];

fn matches_ignore_ascii_case(name: &str, set: &[String]) -> bool {
    set.iter().any(|s| name.eq_ignore_ascii_case(s))
}

/* ================================= Checks ================================= */

/// Diagnostic categories. A disabled category still updates its counters; it only
/// suppresses the marks written into the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checks {
    /// Ambiguous apostrophes at the end (or start) of words.
    pub apostrophe: bool,
    /// Unmatched quotes and brackets.
    pub mismatch: bool,
    /// Quote marks with odd spacing.
    pub spacing: bool,
    /// Nested quotations.
    pub nesting: bool,
}

impl Checks {
    pub fn all() -> Self {
        Self {
            apostrophe: true,
            mismatch: true,
            spacing: true,
            nesting: true,
        }
    }

    pub fn none() -> Self {
        Self {
            apostrophe: false,
            mismatch: false,
            spacing: false,
            nesting: false,
        }
    }

    pub fn any(&self) -> bool {
        self.apostrophe || self.mismatch || self.spacing || self.nesting
    }
}

impl Default for Checks {
    fn default() -> Self {
        Self::all()
    }
}

/* ================================= Config ================================= */

#[derive(Clone, Debug)]
pub struct Config {
    pub checks: Checks,
    /// Marker for ambiguous apostrophes.
    pub mark: String,
    /// Marker used by every other diagnostic.
    pub warn: String,
    /// Maximum depth of nested quotations/brackets before a warning.
    pub max_depth: usize,
    pub allow_same_quotes: bool,
    /// Leave `'` and `"` alone (which also means they are never checked).
    pub ignore_straight_quotes: bool,
    pub skip_leading_apostrophes: bool,
    pub encoding: &'static Encoding,
    pub paragraph_elements: Vec<String>,
    pub invisible_elements: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checks: Checks::all(),
            mark: "*".to_string(),
            warn: "#".to_string(),
            max_depth: 2,
            allow_same_quotes: false,
            ignore_straight_quotes: false,
            skip_leading_apostrophes: false,
            encoding: UTF_8,
            paragraph_elements: PARAGRAPH_ELEMENTS.iter().map(|s| s.to_string()).collect(),
            invisible_elements: INVISIBLE_ELEMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// No marks and no rewriting: the engine reproduces its input exactly.
    pub fn quiet() -> Self {
        Self {
            checks: Checks::none(),
            ignore_straight_quotes: true,
            ..Self::default()
        }
    }

    /// Resolve a WHATWG encoding label such as `utf-8`, `latin1` or `windows-1252`.
    ///
    /// Output is written in the same encoding, so encodings that encode to something
    /// else (UTF-16LE/BE, `replacement`) are refused.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(label.to_string()))?;
        if encoding.output_encoding() != encoding {
            return Err(Error::UnsupportedEncoding(encoding.name()));
        }
        self.encoding = encoding;
        Ok(self)
    }

    pub fn is_paragraph_element(&self, name: &str) -> bool {
        matches_ignore_ascii_case(name, &self.paragraph_elements)
    }

    pub fn is_invisible_element(&self, name: &str) -> bool {
        matches_ignore_ascii_case(name, &self.invisible_elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_tool() {
        let config = Config::default();
        assert_eq!(config.mark, "*");
        assert_eq!(config.warn, "#");
        assert_eq!(config.max_depth, 2);
        assert!(config.checks.any());
        assert_eq!(config.encoding, UTF_8);
    }

    #[test]
    fn element_sets_ignore_case() {
        let config = Config::default();
        assert!(config.is_paragraph_element("P"));
        assert!(config.is_paragraph_element("blockquote"));
        assert!(config.is_paragraph_element("li"));
        assert!(!config.is_paragraph_element("span"));
        assert!(!config.is_paragraph_element("br"));
        assert!(config.is_invisible_element("SCRIPT"));
        assert!(!config.is_invisible_element("p"));
    }

    #[test]
    fn quiet_disables_everything() {
        let config = Config::quiet();
        assert!(!config.checks.any());
        assert!(config.ignore_straight_quotes);
    }

    #[test]
    fn encoding_labels() {
        let config = Config::default().with_encoding_label("latin1").unwrap();
        assert_eq!(config.encoding.name(), "windows-1252");

        let err = Config::default().with_encoding_label("klingon").unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding(ref l) if l == "klingon"));
    }

    #[test]
    fn encodings_that_cannot_round_trip_are_refused() {
        for label in ["utf-16le", "UTF-16BE", "iso-2022-kr"] {
            let err = Config::default().with_encoding_label(label).unwrap_err();
            assert!(matches!(err, Error::UnsupportedEncoding(_)), "{label}: {err}");
        }
        assert!(Config::default().with_encoding_label("iso-8859-2").is_ok());
    }
}
