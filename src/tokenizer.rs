// src/tokenizer.rs
//
// Gonzo XHTML tokenizer.
//
// - Callbacks follow the usual start/end/empty element shape, except there is no
//   attribute data and text is delivered one character at a time.
// - Every callback also receives the raw source text of its token, so a handler can
//   echo the document exactly.
// - Character references are resolved before delivery (`&apos;` arrives as `'`).
//   Unknown references are not fatal: the `&` is passed through as a literal character.
// - CDATA markers are non-character data; the section's content is character data.
// - A `<` that cannot start markup (e.g. `a < b`) is a literal character too.
// - The content of raw-text elements (script, style) is one opaque non-character token,
//   up to the matching end tag.
// - Unterminated tags, comments, CDATA sections and processing instructions are fatal.

use memchr::{memchr, memchr2, memmem};

use crate::entities;
use crate::error::{Error, Result};

/// Receiver for tokenizer events, in document order.
pub trait MarkupHandler {
    fn start_element(&mut self, name: &str, raw: &str) -> Result<()>;
    fn end_element(&mut self, name: &str, raw: &str) -> Result<()>;
    /// Self-closing tag such as `<hr/>`.
    fn empty_element(&mut self, name: &str, raw: &str) -> Result<()>;
    /// Exactly one decoded character. `raw` is its source text (the character itself, or
    /// a reference like `&#8217;`).
    fn character_data(&mut self, c: char, raw: &str) -> Result<()>;
    /// Comments, declarations, processing instructions and CDATA markers.
    fn noncharacter_data(&mut self, raw: &str) -> Result<()>;
    fn end_of_document(&mut self) -> Result<()>;
}

// Longest reference we look for a ';' in, e.g. "&thetasym;" or "&#x10FFFF;".
const MAX_REFERENCE_LEN: usize = 12;

/* ============================ Utility predicates ========================= */

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

/* =============================== Tag parsing ============================= */

#[derive(Clone, Copy, Debug)]
struct TagInfo<'a> {
    name: &'a str,
    is_end: bool,
    self_closing: bool,
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Extract tag name, end/self-closing flags from raw `<...>` text.
fn parse_tag_info(tag: &str) -> TagInfo<'_> {
    let bytes = tag.as_bytes();
    let n = bytes.len();
    let mut i = 1;

    let mut is_end = false;
    if i < n && bytes[i] == b'/' {
        is_end = true;
        i += 1;
    }
    let start = i;
    while i < n && is_name_char(bytes[i]) {
        i += 1;
    }
    // Name bytes are ASCII, so these are char boundaries.
    let name = &tag[start..i];

    // self-closing? check before '>'
    let mut j = n - 1;
    while j > 0 && is_ws(bytes[j - 1]) {
        j -= 1;
    }
    let self_closing = !is_end && j >= 2 && bytes[j - 1] == b'/';

    TagInfo {
        name,
        is_end,
        self_closing,
    }
}

/// Can `b` follow '<' at the start of a tag or declaration?
#[inline]
fn starts_markup(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'/' || b == b'!' || b == b'?' || b == b'_' || b == b':'
}

/* ================================ Tokenizer ============================== */

pub struct Tokenizer<'a> {
    src: &'a str,
    raw_text: &'a [String],
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, raw_text: &[] }
    }

    /// Elements whose content is not markup, matched ignoring ASCII case.
    pub fn raw_text_elements(mut self, names: &'a [String]) -> Self {
        self.raw_text = names;
        self
    }

    fn is_raw_text(&self, name: &str) -> bool {
        self.raw_text.iter().any(|s| name.eq_ignore_ascii_case(s))
    }

    /// Feed the whole document to `handler`, finishing with `end_of_document`.
    pub fn run<H: MarkupHandler>(&self, handler: &mut H) -> Result<()> {
        let s = self.src.as_bytes();
        let n = s.len();
        let mut i = 0usize;

        while i < n {
            // Text run
            let next = memchr2(b'<', b'&', &s[i..]).map_or(n, |off| i + off);
            self.characters(i, next, handler)?;
            i = next;
            if i >= n {
                break;
            }

            i = if s[i] == b'&' {
                self.reference(i, handler)?
            } else {
                self.markup(i, handler)?
            };
        }

        handler.end_of_document()
    }

    fn characters<H: MarkupHandler>(&self, start: usize, end: usize, handler: &mut H) -> Result<()> {
        let text = &self.src[start..end];
        for (off, c) in text.char_indices() {
            handler.character_data(c, &text[off..off + c.len_utf8()])?;
        }
        Ok(())
    }

    fn unterminated(&self, offset: usize, what: &str) -> Error {
        Error::Markup {
            offset,
            message: format!("unterminated {what}"),
        }
    }

    /// `&...;` at `i`. Returns the index just past what was consumed.
    fn reference<H: MarkupHandler>(&self, i: usize, handler: &mut H) -> Result<usize> {
        let s = self.src.as_bytes();
        let window_end = (i + MAX_REFERENCE_LEN).min(s.len());
        let resolved = memchr(b';', &s[i + 1..window_end]).and_then(|off| {
            let end = i + 1 + off;
            let body = &self.src[i + 1..end];
            let c = if body.starts_with('#') {
                entities::numeric(body)
            } else {
                entities::lookup(body)
            };
            c.map(|c| (c, end + 1))
        });

        match resolved {
            Some((c, after)) => {
                handler.character_data(c, &self.src[i..after])?;
                Ok(after)
            }
            None => {
                log::warn!("unrecognised character reference at byte {i}, treating '&' as text");
                handler.character_data('&', "&")?;
                Ok(i + 1)
            }
        }
    }

    /// Markup starting with '<' at `i`. Returns the index just past it.
    fn markup<H: MarkupHandler>(&self, i: usize, handler: &mut H) -> Result<usize> {
        let src = self.src;
        let s = src.as_bytes();
        let rest = &s[i..];

        // Comments
        if rest.starts_with(b"<!--") {
            let end = memmem::find(&rest[4..], b"-->")
                .map(|off| i + 4 + off + 3)
                .ok_or_else(|| self.unterminated(i, "comment"))?;
            handler.noncharacter_data(&src[i..end])?;
            return Ok(end);
        }

        // CDATA: markers are structure, content is text
        if rest.starts_with(b"<![CDATA[") {
            let body = i + 9;
            let close = memmem::find(&s[body..], b"]]>")
                .map(|off| body + off)
                .ok_or_else(|| self.unterminated(i, "CDATA section"))?;
            handler.noncharacter_data(&src[i..body])?;
            self.characters(body, close, handler)?;
            handler.noncharacter_data(&src[close..close + 3])?;
            return Ok(close + 3);
        }

        // DOCTYPE and other declarations
        if rest.starts_with(b"<!") {
            let end = memchr(b'>', rest)
                .map(|off| i + off + 1)
                .ok_or_else(|| self.unterminated(i, "declaration"))?;
            handler.noncharacter_data(&src[i..end])?;
            return Ok(end);
        }

        // Processing instructions
        if rest.starts_with(b"<?") {
            let end = memmem::find(&rest[2..], b"?>")
                .map(|off| i + 2 + off + 2)
                .ok_or_else(|| self.unterminated(i, "processing instruction"))?;
            handler.noncharacter_data(&src[i..end])?;
            return Ok(end);
        }

        if !rest.get(1).copied().is_some_and(starts_markup) {
            log::warn!("stray '<' at byte {i}, treating it as text");
            handler.character_data('<', "<")?;
            return Ok(i + 1);
        }

        // Tags
        let j = find_tag_end(s, i).ok_or_else(|| self.unterminated(i, "tag"))?;
        let tag = &src[i..=j];
        let ti = parse_tag_info(tag);
        if ti.name.is_empty() {
            return Err(Error::Markup {
                offset: i,
                message: format!("tag without a name: {tag}"),
            });
        }

        if ti.is_end {
            handler.end_element(ti.name, tag)?;
        } else if ti.self_closing {
            handler.empty_element(ti.name, tag)?;
        } else {
            handler.start_element(ti.name, tag)?;
            if self.is_raw_text(ti.name) {
                return self.raw_text_until_end(j + 1, ti.name, handler);
            }
        }
        Ok(j + 1)
    }

    /// Deliver everything from `i` up to the matching `</name>` as one token, then the
    /// end tag itself. Returns the index just past the end tag.
    fn raw_text_until_end<H: MarkupHandler>(&self, i: usize, name: &str, handler: &mut H) -> Result<usize> {
        let src = self.src;
        let s = src.as_bytes();
        let n = s.len();

        let mut j = i;
        while let Some(pos) = memmem::find(&s[j..], b"</").map(|off| j + off) {
            let Some(end) = find_tag_end(s, pos) else {
                break;
            };
            let tag = &src[pos..=end];
            let ti = parse_tag_info(tag);
            if ti.name.eq_ignore_ascii_case(name) {
                if pos > i {
                    handler.noncharacter_data(&src[i..pos])?;
                }
                handler.end_element(ti.name, tag)?;
                return Ok(end + 1);
            }
            // Some other end tag; part of the content
            j = pos + 2;
        }

        log::warn!("<{name}> at byte {i} is never closed; the rest of the document is its content");
        if n > i {
            handler.noncharacter_data(&src[i..])?;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records events in a compact notation and checks the raw texts add back up.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        echo: String,
    }

    impl MarkupHandler for Recorder {
        fn start_element(&mut self, name: &str, raw: &str) -> Result<()> {
            self.events.push(format!("<{name}>"));
            self.echo.push_str(raw);
            Ok(())
        }
        fn end_element(&mut self, name: &str, raw: &str) -> Result<()> {
            self.events.push(format!("</{name}>"));
            self.echo.push_str(raw);
            Ok(())
        }
        fn empty_element(&mut self, name: &str, raw: &str) -> Result<()> {
            self.events.push(format!("<{name}/>"));
            self.echo.push_str(raw);
            Ok(())
        }
        fn character_data(&mut self, c: char, raw: &str) -> Result<()> {
            self.events.push(c.to_string());
            self.echo.push_str(raw);
            Ok(())
        }
        fn noncharacter_data(&mut self, raw: &str) -> Result<()> {
            self.events.push(format!("[{raw}]"));
            self.echo.push_str(raw);
            Ok(())
        }
        fn end_of_document(&mut self) -> Result<()> {
            self.events.push("EOF".to_string());
            Ok(())
        }
    }

    fn tokenize(src: &str) -> Recorder {
        let mut rec = Recorder::default();
        Tokenizer::new(src).run(&mut rec).unwrap();
        assert_eq!(rec.echo, src, "raw tokens must reproduce the input");
        rec
    }

    #[test]
    fn elements_and_text() {
        let rec = tokenize(r#"<p class="x">a<br/>b</p>"#);
        assert_eq!(rec.events, vec!["<p>", "a", "<br/>", "b", "</p>", "EOF"]);
    }

    #[test]
    fn quoted_gt_inside_attribute() {
        let rec = tokenize(r#"<a title="1 > 0">x</a>"#);
        assert_eq!(rec.events, vec!["<a>", "x", "</a>", "EOF"]);
    }

    #[test]
    fn references_are_decoded() {
        let rec = tokenize("&apos;&#8217;&#x201C;&eacute;&amp;");
        assert_eq!(rec.events, vec!["'", "’", "“", "é", "&", "EOF"]);
    }

    #[test]
    fn unknown_reference_is_literal() {
        let rec = tokenize("R&D; fish & chips &bogus;");
        assert_eq!(rec.events.iter().filter(|e| *e == "&").count(), 3);
        assert_eq!(rec.events.last().map(String::as_str), Some("EOF"));
    }

    #[test]
    fn comments_doctype_and_pi() {
        let rec = tokenize("<?xml version=\"1.0\"?><!DOCTYPE html><!-- it's --><p/>");
        assert_eq!(
            rec.events,
            vec![
                "[<?xml version=\"1.0\"?>]",
                "[<!DOCTYPE html>]",
                "[<!-- it's -->]",
                "<p/>",
                "EOF"
            ]
        );
    }

    #[test]
    fn cdata_content_is_text() {
        let rec = tokenize("<![CDATA[a]b]]>");
        assert_eq!(rec.events, vec!["[<![CDATA[]", "a", "]", "b", "[]]>]", "EOF"]);
    }

    #[test]
    fn stray_less_than_is_text() {
        let rec = tokenize("1 < 2");
        assert_eq!(rec.events, vec!["1", " ", "<", " ", "2", "EOF"]);
    }

    fn tokenize_raw(src: &str) -> Recorder {
        let names = vec!["script".to_string(), "style".to_string()];
        let mut rec = Recorder::default();
        Tokenizer::new(src)
            .raw_text_elements(&names)
            .run(&mut rec)
            .unwrap();
        assert_eq!(rec.echo, src, "raw tokens must reproduce the input");
        rec
    }

    #[test]
    fn raw_text_content_is_one_token() {
        let rec = tokenize_raw("<script>for(i=0;i<n;i++){}</b></SCRIPT><p>'</p>");
        assert_eq!(
            rec.events,
            vec![
                "<script>",
                "[for(i=0;i<n;i++){}</b>]",
                "</SCRIPT>",
                "<p>",
                "'",
                "</p>",
                "EOF"
            ]
        );
    }

    #[test]
    fn empty_and_self_closing_raw_text() {
        let rec = tokenize_raw("<style></style><script src=\"x.js\"/>a");
        assert_eq!(rec.events, vec!["<style>", "</style>", "<script/>", "a", "EOF"]);
    }

    #[test]
    fn unclosed_raw_text_runs_to_the_end() {
        let rec = tokenize_raw("<style>p { }<p>x");
        assert_eq!(rec.events, vec!["<style>", "[p { }<p>x]", "EOF"]);
    }

    #[test]
    fn raw_text_is_markup_without_the_list() {
        let rec = tokenize("<script>a<b>c</script>");
        assert_eq!(rec.events, vec!["<script>", "a", "<b>", "c", "</script>", "EOF"]);
    }

    #[test]
    fn multibyte_text() {
        let rec = tokenize("«né»");
        assert_eq!(rec.events, vec!["«", "n", "é", "»", "EOF"]);
    }

    #[test]
    fn unterminated_markup_is_fatal() {
        for src in ["<p", "<!-- x", "<![CDATA[ x", "<?pi", "<!DOCTYPE"] {
            let mut rec = Recorder::default();
            let err = Tokenizer::new(src).run(&mut rec).unwrap_err();
            assert!(matches!(err, Error::Markup { offset: 0, .. }), "{src}: {err}");
        }
    }

    #[test]
    fn end_tag_without_name_is_fatal() {
        let mut rec = Recorder::default();
        let err = Tokenizer::new("a</ >").run(&mut rec).unwrap_err();
        assert!(matches!(err, Error::Markup { offset: 1, .. }));
    }
}
