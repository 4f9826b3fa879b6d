//! Node type definitions.
//!
//! The `NodeKind` enum represents every node type the parser produces. Each
//! variant carries the node-type-specific payload (tag name and attributes,
//! text content, and so on). Navigation links live in `NodeData`, not here.

use super::Attribute;
use crate::parser::input::is_xml_whitespace;

/// The kind of an XML node and its associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element, e.g. `<movie year="1999">`.
    Tag {
        /// The tag name as written in the source.
        name: String,
        /// Attributes in source order. Names are unique within a tag.
        attributes: Vec<Attribute>,
    },

    /// Character content between markup ("naked" text).
    Text {
        /// The text with the predefined entities decoded. Whitespace is
        /// preserved verbatim.
        content: String,
    },

    /// A CDATA section, e.g. `<![CDATA[...]]>`.
    CData {
        /// The section content, taken verbatim.
        content: String,
    },

    /// A comment, e.g. `<!-- ... -->`.
    Comment {
        /// The comment body without the `<!--` and `-->` delimiters.
        content: String,
    },

    /// A processing instruction, e.g. `<?xml-stylesheet href="a.xsl"?>`.
    ///
    /// The XML declaration is stored as a processing instruction with
    /// target `xml`.
    ProcessingInstruction {
        /// The PI target.
        target: String,
        /// Everything after the target and its separating whitespace, up to
        /// `?>`. Empty when the instruction has no body.
        data: String,
    },

    /// A document type declaration, e.g. `<!DOCTYPE movies SYSTEM "m.dtd">`.
    DocumentType {
        /// The raw text between `<!DOCTYPE` and the terminating `>`.
        declaration: String,
    },
}

impl NodeKind {
    /// Returns `true` for [`NodeKind::Tag`].
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag { .. })
    }

    /// Returns `true` for a text node containing only XML whitespace
    /// (space, tab, CR, LF).
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text { content } if content.chars().all(is_xml_whitespace))
    }
}

/// A node-kind predicate for filtering child lists.
///
/// ```
/// use smallxml::tree::NodeFilter;
///
/// let doc = smallxml::parse("<a>text<b/><!--c--></a>").unwrap();
/// let root = doc.root_node();
/// assert_eq!(doc.children_filtered(root, NodeFilter::Tag).count(), 1);
/// assert_eq!(doc.children_filtered(root, NodeFilter::Any).count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeFilter {
    /// Every node.
    #[default]
    Any,
    /// Element nodes only.
    Tag,
    /// Text nodes only.
    Text,
    /// Comment nodes only.
    Comment,
    /// CDATA sections only.
    CData,
    /// Processing instructions only.
    ProcessingInstruction,
    /// Doctype declarations only.
    DocumentType,
}

impl NodeFilter {
    /// Returns `true` if `kind` passes this filter.
    #[must_use]
    pub fn matches(self, kind: &NodeKind) -> bool {
        match self {
            Self::Any => true,
            Self::Tag => matches!(kind, NodeKind::Tag { .. }),
            Self::Text => matches!(kind, NodeKind::Text { .. }),
            Self::Comment => matches!(kind, NodeKind::Comment { .. }),
            Self::CData => matches!(kind, NodeKind::CData { .. }),
            Self::ProcessingInstruction => matches!(kind, NodeKind::ProcessingInstruction { .. }),
            Self::DocumentType => matches!(kind, NodeKind::DocumentType { .. }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_only_its_kind() {
        let tag = NodeKind::Tag {
            name: "a".to_string(),
            attributes: vec![],
        };
        let text = NodeKind::Text {
            content: "hi".to_string(),
        };
        assert!(NodeFilter::Tag.matches(&tag));
        assert!(!NodeFilter::Tag.matches(&text));
        assert!(NodeFilter::Text.matches(&text));
        assert!(NodeFilter::Any.matches(&tag));
        assert!(NodeFilter::Any.matches(&text));
    }

    #[test]
    fn test_is_blank_text() {
        let blank = NodeKind::Text {
            content: " \n\t".to_string(),
        };
        let word = NodeKind::Text {
            content: " x ".to_string(),
        };
        assert!(blank.is_blank_text());
        assert!(!word.is_blank_text());
        assert!(!NodeKind::Comment {
            content: String::new()
        }
        .is_blank_text());
    }

    #[test]
    fn test_unicode_spaces_are_not_blank() {
        for content in ["\u{a0}", "\u{3000}", " \u{2028}\n"] {
            let text = NodeKind::Text {
                content: content.to_string(),
            };
            assert!(!text.is_blank_text(), "{content:?}");
        }
    }
}
