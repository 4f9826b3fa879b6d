//! Error types for XML parsing.
//!
//! Every failure carries the [`SourceLocation`] where it was detected: the
//! character offset from the start of the input, the byte offset, and a
//! 1-based line/column pair for human-readable diagnostics.
//!
//! Parsing is all-or-nothing. A `ParseError` means no `Document` was built.

use std::fmt;

use thiserror::Error;

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// 0-based character offset from the start of the input.
    pub offset: usize,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
}

impl Default for SourceLocation {
    /// The start of the input.
    fn default() -> Self {
        Self {
            offset: 0,
            byte_offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// Missing `=`, missing or unbalanced quote, or a repeated attribute name.
    #[error("malformed attribute")]
    MalformedAttribute,
    /// A tag, comment, CDATA section, processing instruction or doctype
    /// without its closing marker before end of input.
    #[error("unterminated construct")]
    UnterminatedConstruct,
    /// A tag with a missing or invalid name, or unexpected content inside
    /// the tag delimiters.
    #[error("malformed tag")]
    MalformedTag,
    /// A close tag whose name does not match the currently open tag.
    #[error("mismatched close tag")]
    MismatchedCloseTag,
    /// A close tag with no open tag to close.
    #[error("unexpected close tag")]
    UnexpectedCloseTag,
    /// A second top-level element after the root element closed.
    #[error("multiple root elements")]
    MultipleRootElements,
    /// End of input with tags still open.
    #[error("unclosed tag")]
    UnclosedTag,
    /// End of input without any element.
    #[error("no root element")]
    NoRootElement,
    /// A configured limit from `ParseOptions` was exceeded.
    #[error("limit exceeded")]
    LimitExceeded,
}

/// The error type returned when XML parsing fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {location}: {message}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Where in the source the error was detected.
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    /// Returns the character offset at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.location.offset
    }
}
