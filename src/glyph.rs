// src/glyph.rs
//
// The alphabet the checker works on: literal characters from text content, one token for
// a run of (breaking) whitespace, and one token for a paragraph boundary.

pub const LEFT_SINGLE: char = '\u{2018}'; // ‘
pub const RIGHT_SINGLE: char = '\u{2019}'; // ’ (also the apostrophe)
pub const LEFT_DOUBLE: char = '\u{201C}'; // “
pub const RIGHT_DOUBLE: char = '\u{201D}'; // ”

// Unicode has more spaces, but only these two have non-breaking variants.
pub const NBSP: char = '\u{00A0}';
pub const NARROW_NBSP: char = '\u{202F}';

/// Whitespace a line may break at.
#[inline]
pub fn is_breakspace(c: char) -> bool {
    c.is_whitespace() && c != NBSP && c != NARROW_NBSP
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Char(char),
    Space,
    Paragraph,
}

impl Glyph {
    /// Canonicalize one character of text content.
    pub fn classify(c: char) -> Self {
        if is_breakspace(c) {
            Glyph::Space
        } else {
            Glyph::Char(c)
        }
    }

    /// A paragraph boundary counts too: it behaves like leading whitespace.
    pub fn is_breakspace(self) -> bool {
        match self {
            Glyph::Char(c) => is_breakspace(c),
            Glyph::Space | Glyph::Paragraph => true,
        }
    }

    pub fn is_alphanumeric(self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_alphanumeric())
    }

    pub fn is_alphabetic(self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_alphabetic())
    }

    pub fn punct(self) -> Punct {
        match self {
            Glyph::Char('(') => Punct::OpenParen,
            Glyph::Char(')') => Punct::CloseParen,
            Glyph::Char('[') => Punct::OpenBracket,
            Glyph::Char(']') => Punct::CloseBracket,
            Glyph::Char(LEFT_DOUBLE) => Punct::OpenDouble,
            Glyph::Char(RIGHT_DOUBLE) => Punct::CloseDouble,
            Glyph::Char(LEFT_SINGLE) => Punct::OpenSingle,
            Glyph::Char(RIGHT_SINGLE) => Punct::Apostrophe,
            _ => Punct::Other,
        }
    }
}

/// The role a glyph can play in the punctuation stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punct {
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenDouble,
    CloseDouble,
    OpenSingle,
    /// Closing single quote or apostrophe; the two share one glyph.
    Apostrophe,
    Other,
}
