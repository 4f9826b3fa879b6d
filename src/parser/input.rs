//! Low-level input cursor shared by the scanner.
//!
//! [`ScanInput`] wraps the source text and tracks the current position as a
//! byte offset, a character offset and a line/column pair. It provides the
//! peeking, advancing and name-scanning primitives the scanner is written
//! in terms of, plus entity decoding for text runs and attribute values.

use std::borrow::Cow;

use crate::error::{ErrorKind, ParseError, SourceLocation};

// -------------------------------------------------------------------------
// Limits
// -------------------------------------------------------------------------

/// Default maximum element nesting depth.
pub(crate) const DEFAULT_MAX_DEPTH: u32 = 256;

/// Default maximum number of attributes on a single tag.
pub(crate) const DEFAULT_MAX_ATTRIBUTES: u32 = 256;

/// Default maximum length (in bytes) of a tag or attribute name.
pub(crate) const DEFAULT_MAX_NAME_LENGTH: usize = 50_000;

// -------------------------------------------------------------------------
// Name character classes (XML 1.0 §2.3)
// -------------------------------------------------------------------------

/// Returns `true` if `c` may start a tag, attribute or PI target name.
pub(crate) fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` may continue a name.
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

pub(crate) fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

// -------------------------------------------------------------------------
// Entity decoding
// -------------------------------------------------------------------------

/// Decodes the five predefined entities (`&lt; &gt; &amp; &apos; &quot;`)
/// and numeric character references (`&#60;`, `&#x3C;`).
///
/// Anything else that starts with `&`, including unknown entity names and
/// references without a terminating `;`, is kept literally. Borrows the
/// input when there is nothing to decode.
pub(crate) fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_reference(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decodes one reference at the start of `s` (which begins with `&`),
/// returning the character and the byte length of the reference.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let semi = s.find(';')?;
    let body = &s[1..semi];
    let ch = match body {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "apos" => '\'',
        "quot" => '"',
        _ => {
            let digits = body.strip_prefix('#')?;
            let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                    u32::from_str_radix(hex, 16).ok()?
                }
                Some(_) => return None,
                None if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse::<u32>().ok()?,
                None => return None,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}

// -------------------------------------------------------------------------
// ScanInput
// -------------------------------------------------------------------------

/// Cursor over the source text.
pub(crate) struct ScanInput<'a> {
    input: &'a str,
    /// Current byte offset.
    pos: usize,
    /// Current character offset.
    offset: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column (1-based, in characters).
    column: u32,
    max_name_length: usize,
}

impl<'a> ScanInput<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }

    pub fn set_max_name_length(&mut self, max: usize) {
        self.max_name_length = max;
    }

    // -- Position queries --

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            offset: self.offset,
            byte_offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the unconsumed part of the input.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    // -- Peek operations --

    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn looking_at(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    // -- Advance operations --

    pub fn advance_char(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.offset += 1;
        self.pos += ch.len_utf8();
    }

    /// Advances over the next `len` bytes, which must end on a character
    /// boundary.
    pub fn advance_bytes(&mut self, len: usize) {
        let end = (self.pos + len).min(self.input.len());
        let consumed = &self.input[self.pos..end];
        for ch in consumed.chars() {
            self.advance_char(ch);
        }
    }

    /// Advances over `marker` if the input starts with it.
    pub fn eat(&mut self, marker: &str) -> bool {
        if self.looking_at(marker) {
            self.advance_bytes(marker.len());
            true
        } else {
            false
        }
    }

    /// Returns the text up to the next occurrence of `marker` and advances
    /// past the marker. Returns `None`, without advancing, if the marker
    /// never occurs.
    pub fn take_until(&mut self, marker: &str) -> Option<&'a str> {
        let rest = self.remaining();
        let end = rest.find(marker)?;
        let taken = &rest[..end];
        self.advance_bytes(end + marker.len());
        Some(taken)
    }

    /// Takes the text up to the next `<` or the end of input.
    pub fn take_text(&mut self) -> &'a str {
        let rest = self.remaining();
        let end = rest.find('<').unwrap_or(rest.len());
        self.advance_bytes(end);
        &rest[..end]
    }

    /// Skips whitespace. Returns `true` if any was consumed.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !is_xml_whitespace(ch) {
                break;
            }
            self.advance_char(ch);
        }
        self.pos > start
    }

    // -- Names --

    /// Scans a tag or attribute name.
    pub fn parse_name(&mut self) -> Result<&'a str, ParseError> {
        let start = self.pos;
        match self.peek_char() {
            Some(first) if is_name_start_char(first) => self.advance_char(first),
            Some(other) => {
                return Err(self.error(
                    ErrorKind::MalformedTag,
                    format!("invalid name start character '{other}'"),
                ))
            }
            None => {
                return Err(self.error(
                    ErrorKind::UnterminatedConstruct,
                    "expected name, found end of input",
                ))
            }
        }

        while let Some(ch) = self.peek_char() {
            if !is_name_char(ch) {
                break;
            }
            self.advance_char(ch);
        }

        let len = self.pos - start;
        if len > self.max_name_length {
            return Err(self.error(
                ErrorKind::LimitExceeded,
                format!("name length ({len}) exceeds maximum ({})", self.max_name_length),
            ));
        }
        Ok(&self.input[start..self.pos])
    }

    // -- Error helpers --

    /// Creates a `ParseError` at the current location.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message, self.location())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column_and_offsets() {
        let mut input = ScanInput::new("ab\ncé<");
        input.advance_bytes(3);
        let loc = input.location();
        assert_eq!((loc.line, loc.column, loc.offset, loc.byte_offset), (2, 1, 3, 3));

        // 'é' is two bytes but one character
        assert_eq!(input.take_text(), "cé");
        let loc = input.location();
        assert_eq!((loc.line, loc.column, loc.offset, loc.byte_offset), (2, 3, 5, 6));
        assert!(input.looking_at("<"));
    }

    #[test]
    fn test_take_until() {
        let mut input = ScanInput::new(" note -->rest");
        assert_eq!(input.take_until("-->"), Some(" note "));
        assert_eq!(input.remaining(), "rest");
        assert_eq!(input.take_until("-->"), None);
        assert_eq!(input.remaining(), "rest");
    }

    #[test]
    fn test_parse_name() {
        let mut input = ScanInput::new("movie-list x");
        assert_eq!(input.parse_name().unwrap(), "movie-list");
        assert!(input.skip_whitespace());
        assert_eq!(input.parse_name().unwrap(), "x");
    }

    #[test]
    fn test_parse_name_rejects_digit_start() {
        let mut input = ScanInput::new("1abc");
        let err = input.parse_name().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedTag);
    }

    #[test]
    fn test_parse_name_length_limit() {
        let mut input = ScanInput::new("abcdef");
        input.set_max_name_length(3);
        let err = input.parse_name().unwrap_err();
        assert_eq!(err.kind, ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_decode_predefined_entities() {
        assert_eq!(
            decode_entities("&lt;a&gt; &amp; &apos;b&apos; &quot;c&quot;"),
            "<a> & 'b' \"c\""
        );
    }

    #[test]
    fn test_decode_char_references() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
    }

    #[test]
    fn test_decode_keeps_unknown_references() {
        assert_eq!(decode_entities("&nbsp; & &amp"), "&nbsp; & &amp");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_decode_rejects_signed_char_references() {
        assert_eq!(decode_entities("&#+65;&#x+41;&#-1;"), "&#+65;&#x+41;&#-1;");
        assert_eq!(decode_entities("&#;&#x;"), "&#;&#x;");
    }

    #[test]
    fn test_decode_borrows_plain_text() {
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }
}
