//! # smallxml
//!
//! A small, non-validating XML parser. Text is tokenized by a hand-rolled
//! scanner, assembled into an arena-backed node tree with depth tracking,
//! and can be rendered back to indented text.
//!
//! ## Quick Start
//!
//! ```
//! let doc = smallxml::parse("<root><child id=\"1\">Hello</child></root>").unwrap();
//! let root = doc.root_node();
//! assert_eq!(doc.name(root), Some("root"));
//!
//! let child = doc.children(root).next().unwrap();
//! assert_eq!(doc.attribute(child, "id"), Some("1"));
//! assert_eq!(doc.path(child), "root/child");
//!
//! assert_eq!(
//!     smallxml::render(&doc),
//!     "<root>\n  <child id=\"1\">Hello</child>\n</root>\n"
//! );
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: the scanner and tree builder, plus [`parser::ParseOptions`]
//! - [`tree`]: the [`Document`] arena and its navigation methods
//! - [`serial`]: the indented renderer
//! - [`stats`]: node-kind counts and unique tag paths
//! - [`encoding`]: byte-order-mark and declaration based decoding

pub mod encoding;
pub mod error;
pub mod parser;
pub mod serial;
pub mod stats;
pub mod tree;

pub use error::{ErrorKind, ParseError, SourceLocation};
pub use tree::{Attribute, Document, NodeFilter, NodeId, NodeKind};

/// Parses XML text with default options.
///
/// A leading byte order mark is ignored.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    Document::parse_str(text)
}

/// Renders a document as indented text, two spaces per level.
#[must_use]
pub fn render(doc: &Document) -> String {
    serial::render(doc)
}
