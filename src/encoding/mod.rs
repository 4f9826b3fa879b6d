//! Encoding detection and transcoding.
//!
//! Input bytes are decoded to UTF-8 before scanning. The encoding is chosen
//! in this order:
//!
//! 1. A byte order mark, if present, decides the encoding outright.
//! 2. Otherwise the `encoding="..."` pseudo-attribute of a leading
//!    `<?xml ...?>` declaration, read as ASCII.
//! 3. Otherwise UTF-8.
//!
//! Transcoding itself is delegated to `encoding_rs`.

use encoding_rs::{Encoding, UTF_8};

/// How far into the input the XML declaration is looked for.
const DECLARATION_SCAN_LIMIT: usize = 256;

/// An error that occurs during encoding detection or transcoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The declared encoding label is not known to `encoding_rs`.
    #[error("unsupported encoding: {0}")]
    Unsupported(String),
    /// The input is not valid in the chosen encoding.
    #[error("malformed byte sequence for encoding {0}")]
    Malformed(&'static str),
}

/// Detects the encoding of a byte stream from its byte order mark.
///
/// Returns the encoding and the length of the BOM to skip. Input without a
/// BOM is reported as UTF-8 with nothing to skip.
///
/// # Examples
///
/// ```
/// use smallxml::encoding::detect_encoding;
///
/// let (enc, skip) = detect_encoding(b"\xFF\xFE<\x00");
/// assert_eq!(enc.name(), "UTF-16LE");
/// assert_eq!(skip, 2);
///
/// let (enc, skip) = detect_encoding(b"<root/>");
/// assert_eq!(enc.name(), "UTF-8");
/// assert_eq!(skip, 0);
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    Encoding::for_bom(bytes).unwrap_or((UTF_8, 0))
}

/// Transcodes bytes in the named encoding into a UTF-8 `String`.
///
/// The label is matched case-insensitively, as `encoding_rs` does. A BOM in
/// `bytes` is not interpreted.
///
/// # Errors
///
/// Returns `EncodingError::Unsupported` for an unknown label and
/// `EncodingError::Malformed` if the bytes are invalid in that encoding.
///
/// # Examples
///
/// ```
/// use smallxml::encoding::transcode;
///
/// assert_eq!(transcode(b"caf\xE9", "ISO-8859-1").unwrap(), "caf\u{e9}");
/// ```
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, EncodingError> {
    let encoding = lookup(label)?;
    decode_with(encoding, bytes)
}

/// Decodes raw XML bytes into a UTF-8 string, detecting the encoding.
///
/// # Errors
///
/// Returns `EncodingError` if the declared encoding is unknown or the bytes
/// are invalid in the detected encoding.
///
/// # Examples
///
/// ```
/// use smallxml::encoding::decode_to_utf8;
///
/// let text = decode_to_utf8(b"\xEF\xBB\xBF<root/>").unwrap();
/// assert_eq!(text, "<root/>");
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (bom_encoding, skip) = detect_encoding(bytes);
    let body = &bytes[skip..];

    let encoding = if skip > 0 {
        bom_encoding
    } else {
        match declared_label(body) {
            Some(label) => {
                let declared = lookup(label)?;
                // A declaration readable as ASCII rules out UTF-16 input.
                if declared.is_ascii_compatible() {
                    declared
                } else {
                    UTF_8
                }
            }
            None => UTF_8,
        }
    };

    log::debug!(
        target: "smallxml::encoding",
        "decoding {} bytes as {}",
        body.len(),
        encoding.name()
    );
    decode_with(encoding, body)
}

fn lookup(label: &str) -> Result<&'static Encoding, EncodingError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| EncodingError::Unsupported(label.to_string()))
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, EncodingError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
        .ok_or(EncodingError::Malformed(encoding.name()))
}

/// Reads the `encoding` pseudo-attribute of a leading XML declaration.
///
/// The declaration is ASCII in every ASCII-compatible encoding, so the
/// bytes are scanned directly without decoding.
fn declared_label(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(DECLARATION_SCAN_LIMIT)];
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = &head[..end];

    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = trim_ascii_start(&decl[at + 8..]);
    let rest = trim_ascii_start(rest.strip_prefix(b"=")?);
    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let close = rest.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&rest[..close]).ok()
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count();
    &bytes[skip..]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_boms() {
        assert_eq!(detect_encoding(b"\xEF\xBB\xBF<r/>").1, 3);
        assert_eq!(detect_encoding(b"\xFE\xFF\x00<").0.name(), "UTF-16BE");
        assert_eq!(detect_encoding(b"\xFF\xFE<\x00").0.name(), "UTF-16LE");
    }

    #[test]
    fn test_detect_short_input() {
        assert_eq!(detect_encoding(b""), (UTF_8, 0));
        assert_eq!(detect_encoding(b"\xEF"), (UTF_8, 0));
    }

    #[test]
    fn test_decode_plain_utf8() {
        let text = decode_to_utf8("<r>héllo</r>".as_bytes()).unwrap();
        assert_eq!(text, "<r>héllo</r>");
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let bytes = b"\xFF\xFE<\x00r\x00/\x00>\x00";
        assert_eq!(decode_to_utf8(bytes).unwrap(), "<r/>");
    }

    #[test]
    fn test_decode_declared_latin1() {
        let mut bytes = b"<?xml version=\"1.0\" encoding='ISO-8859-1'?>".to_vec();
        bytes.extend_from_slice(b"<r>caf\xE9</r>");
        let text = decode_to_utf8(&bytes).unwrap();
        assert!(text.ends_with("<r>caf\u{e9}</r>"));
    }

    #[test]
    fn test_declared_label() {
        assert_eq!(
            declared_label(b"<?xml version=\"1.0\" encoding = \"UTF-8\"?><r/>"),
            Some("UTF-8")
        );
        assert_eq!(declared_label(b"<?xml version=\"1.0\"?><r/>"), None);
        assert_eq!(declared_label(b"<r/>"), None);
    }

    #[test]
    fn test_unknown_declared_encoding() {
        let err = decode_to_utf8(b"<?xml version=\"1.0\" encoding=\"EBCDIC-42\"?><r/>")
            .unwrap_err();
        assert_eq!(err, EncodingError::Unsupported("EBCDIC-42".to_string()));
        assert_eq!(err.to_string(), "unsupported encoding: EBCDIC-42");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode_to_utf8(&[b'<', 0x80, 0x81]).unwrap_err();
        assert_eq!(err, EncodingError::Malformed("UTF-8"));
    }

    #[test]
    fn test_transcode_unknown_label() {
        assert!(matches!(
            transcode(b"x", "no-such-charset"),
            Err(EncodingError::Unsupported(_))
        ));
    }
}
