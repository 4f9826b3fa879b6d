//! Indented XML renderer.
//!
//! Renders a `Document` as text with one fixed indent unit per depth level.
//! Elements whose content is only other tags (plus formatting whitespace)
//! put each child on its own line; elements holding text or CDATA are
//! rendered inline so their character data round-trips unchanged.

use crate::tree::{Document, NodeId, NodeKind};

/// Options controlling rendered output.
///
/// # Examples
///
/// ```
/// use smallxml::serial::{render_with_options, RenderOptions};
///
/// let doc = smallxml::parse("<root><child>Hello</child></root>").unwrap();
/// let xml = render_with_options(&doc, &RenderOptions::default().indent_str("\t"));
/// assert_eq!(xml, "<root>\n\t<child>Hello</child>\n</root>\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// The indentation emitted once per nesting level.
    /// Defaults to two spaces.
    pub indent_str: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_str: "  ".to_string(),
        }
    }
}

impl RenderOptions {
    /// Sets the indentation string used for each nesting level.
    ///
    /// The default is two spaces (`"  "`). An empty string renders
    /// element-only content flush left, still one child per line.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }
}

/// Renders a document with the default options.
///
/// # Examples
///
/// ```
/// let doc = smallxml::parse("<a><b x=\"1\"/><c>hi</c></a>").unwrap();
/// assert_eq!(
///     smallxml::serial::render(&doc),
///     "<a>\n  <b x=\"1\"/>\n  <c>hi</c>\n</a>\n"
/// );
/// ```
#[must_use]
pub fn render(doc: &Document) -> String {
    render_with_options(doc, &RenderOptions::default())
}

/// Renders a document with the given options.
///
/// Prolog nodes, the root element and trailing nodes each start on their
/// own line. Every line, including the last, ends with `\n`.
#[must_use]
pub fn render_with_options(doc: &Document, options: &RenderOptions) -> String {
    let mut renderer = Renderer {
        doc,
        indent: &options.indent_str,
        out: String::new(),
    };
    for &id in doc.prolog_nodes() {
        renderer.node(id, 0, true);
    }
    renderer.node(doc.root_node(), 0, true);
    for &id in doc.trailing_nodes() {
        renderer.node(id, 0, true);
    }
    renderer.out
}

/// Returns `true` if the tag contains at least one tag child and otherwise
/// only whitespace text, comments and processing instructions.
fn is_element_only(doc: &Document, id: NodeId) -> bool {
    let mut has_tag_child = false;
    for child in doc.children(id) {
        let kind = doc.kind(child);
        match kind {
            NodeKind::Tag { .. } => has_tag_child = true,
            NodeKind::Text { .. } if !kind.is_blank_text() => return false,
            NodeKind::CData { .. } => return false,
            _ => {}
        }
    }
    has_tag_child
}

struct Renderer<'a> {
    doc: &'a Document,
    indent: &'a str,
    out: String,
}

impl Renderer<'_> {
    fn pad(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
    }

    /// Renders `id`. In block position the node gets its own indented line.
    fn node(&mut self, id: NodeId, depth: usize, block: bool) {
        if block {
            self.pad(depth);
        }
        match self.doc.kind(id) {
            NodeKind::Tag { name, attributes } => {
                self.out.push('<');
                self.out.push_str(name);
                for attr in attributes {
                    self.out.push(' ');
                    self.out.push_str(&attr.name);
                    self.out.push_str("=\"");
                    write_escaped_attr(&mut self.out, &attr.value);
                    self.out.push('"');
                }

                if self.doc.first_child(id).is_none() {
                    self.out.push_str("/>");
                } else {
                    self.out.push('>');
                    if is_element_only(self.doc, id) {
                        self.out.push('\n');
                        for child in self.doc.children(id) {
                            if self.doc.kind(child).is_blank_text() {
                                continue;
                            }
                            self.node(child, depth + 1, true);
                        }
                        self.pad(depth);
                    } else {
                        for child in self.doc.children(id) {
                            self.node(child, depth + 1, false);
                        }
                    }
                    self.out.push_str("</");
                    self.out.push_str(name);
                    self.out.push('>');
                }
            }
            NodeKind::Text { content } => write_escaped_text(&mut self.out, content),
            NodeKind::CData { content } => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(content);
                self.out.push_str("]]>");
            }
            NodeKind::Comment { content } => {
                self.out.push_str("<!--");
                self.out.push_str(content);
                self.out.push_str("-->");
            }
            NodeKind::ProcessingInstruction { target, data } => {
                self.out.push_str("<?");
                self.out.push_str(target);
                if !data.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(data);
                }
                self.out.push_str("?>");
            }
            NodeKind::DocumentType { declaration } => {
                self.out.push_str("<!DOCTYPE");
                self.out.push_str(declaration);
                self.out.push('>');
            }
        }
        if block {
            self.out.push('\n');
        }
    }
}

/// Escapes character data: `&`, `<` and `>`.
fn write_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes an attribute value for a double-quoted attribute.
///
/// Tabs and line breaks become character references so they survive
/// attribute-value normalization on re-parse.
fn write_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}
