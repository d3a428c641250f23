// src/output.rs

use std::io::{self, Write};

/// Echoes the input verbatim while letting the engine slip marks in.
///
/// Structural tokens (tags, comments, declarations) are held back until the next character
/// of text has been decided, so a mark about the previous character can still be written
/// in front of them.
pub struct OutputWriter<W: Write> {
    inner: W,
    pending: String,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: String::new(),
        }
    }

    /// Write a marker now, ahead of anything buffered.
    pub fn mark(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_all(text.as_bytes())
    }

    /// Hold back a non-text token.
    pub fn save_token(&mut self, raw: &str) {
        self.pending.push_str(raw);
    }

    /// Write the held-back tokens followed by the token just decided.
    pub fn flush(&mut self, current: &str) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(self.pending.as_bytes())?;
            self.pending.clear();
        }
        self.inner.write_all(current.as_bytes())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.flush("")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_go_before_buffered_tokens() {
        let mut out = OutputWriter::new(Vec::new());
        out.flush("a").unwrap();
        out.save_token("</em>");
        out.save_token("<!-- x -->");
        out.mark("*").unwrap();
        out.flush(" ").unwrap();
        out.save_token("</p>");
        let bytes = out.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a*</em><!-- x --> </p>");
    }
}
