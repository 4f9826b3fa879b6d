//! XML parser.
//!
//! Parsing runs in two stages over a text buffer already resident in
//! memory:
//!
//! 1. The [`Scanner`] splits the text into lexical [`Token`]s.
//! 2. The tree builder consumes those tokens with an explicit stack of open
//!    tags and produces a [`Document`].
//!
//! Both stages are hand-rolled and single-pass. Parsing either returns a
//! complete, consistent `Document` or a [`ParseError`]; there is no
//! partial result.

mod builder;
pub(crate) mod input;
pub mod scanner;

pub use scanner::{Scanner, Token, TokenKind};

use crate::error::ParseError;
use crate::tree::Document;

use builder::TreeBuilder;
use input::{DEFAULT_MAX_ATTRIBUTES, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NAME_LENGTH};

/// Parse options controlling whitespace handling and input limits.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use smallxml::parser::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .no_blanks(true)
///     .max_depth(64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// If true, whitespace-only text inside elements is dropped.
    /// Whitespace-only text outside the root element is always dropped.
    pub no_blanks: bool,
    /// Maximum element nesting depth; the root element is depth 0
    /// (default: 256).
    pub max_depth: u32,
    /// Maximum number of attributes on a single tag (default: 256).
    pub max_attributes: u32,
    /// Maximum length in bytes of a tag or attribute name (default: 50,000).
    pub max_name_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            no_blanks: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl ParseOptions {
    /// Enables or disables stripping of blank text nodes.
    #[must_use]
    pub fn no_blanks(mut self, yes: bool) -> Self {
        self.no_blanks = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the maximum number of attributes per tag.
    #[must_use]
    pub fn max_attributes(mut self, max: u32) -> Self {
        self.max_attributes = max;
        self
    }

    /// Sets the maximum tag/attribute name length in bytes.
    #[must_use]
    pub fn max_name_length(mut self, max: usize) -> Self {
        self.max_name_length = max;
        self
    }
}

/// Parses an XML string with default options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed XML.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed XML or exceeds one
/// of the configured limits.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    log::debug!(target: "smallxml::parser", "parsing {} bytes", input.len());

    let mut scanner = Scanner::with_options(input, options);
    let mut builder = TreeBuilder::new(options, input.len());
    for token in scanner.by_ref() {
        builder.push_token(token?)?;
    }
    let doc = builder.finish(scanner.location())?;

    log::debug!(
        target: "smallxml::parser",
        "parsed document: {} nodes, {} prolog, {} trailing",
        doc.node_count(),
        doc.prolog_nodes().len(),
        doc.trailing_nodes().len()
    );
    Ok(doc)
}
