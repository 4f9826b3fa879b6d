//! Arena-based XML document tree.
//!
//! All nodes live in a contiguous `Vec<NodeData>` owned by the `Document`
//! and are referenced by `NodeId`, a newtype over `NonZeroU32`. Parent,
//! child and sibling links are arena indices, so there are no reference
//! cycles and dropping the `Document` frees the whole tree at once.
//!
//! A `Document` is built once by the parser and is read-only afterwards.
//! It holds three top-level sequences: the prolog (everything before the
//! root element), the root element itself, and the trailing nodes after
//! the root element closes.

mod node;

pub use node::{NodeFilter, NodeKind};

use std::num::NonZeroU32;

use crate::encoding::decode_to_utf8;
use crate::error::{ErrorKind, ParseError, SourceLocation};

/// A typed index into the document's node arena.
///
/// `Option<NodeId>` has the same size as `NodeId` (niche optimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    #[allow(clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        // index + 1 is never zero
        Self(NonZeroU32::MIN.saturating_add(index as u32))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is and its payload.
    pub kind: NodeKind,
    /// Nesting level: 0 for the root element and for top-level nodes,
    /// parent depth + 1 otherwise.
    pub depth: u32,
    /// Parent element, if any. The root and top-level nodes have none.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind, depth: u32) -> Self {
        Self {
            kind,
            depth,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An attribute on a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value with entity references decoded.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute from a name and an already-decoded value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The node arena the tree builder appends into.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<NodeData>,
}

impl NodeArena {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Allocates a detached node.
    pub(crate) fn create_node(&mut self, kind: NodeKind, depth: u32) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind, depth));
        NodeId::from_index(index)
    }

    /// Appends `child` to the end of `parent`'s child list.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent"
        );

        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// A parsed XML document.
///
/// # Examples
///
/// ```
/// use smallxml::Document;
///
/// let doc = Document::parse_str(r#"<movies><movie title="Alien"/></movies>"#).unwrap();
/// let root = doc.root_node();
/// assert_eq!(doc.name(root), Some("movies"));
///
/// let movie = doc.children(root).next().unwrap();
/// assert_eq!(doc.attribute(movie, "title"), Some("Alien"));
/// assert_eq!(doc.depth(movie), 1);
/// assert_eq!(doc.path(movie), "movies/movie");
/// ```
#[derive(Debug)]
pub struct Document {
    arena: NodeArena,
    prolog: Vec<NodeId>,
    root: NodeId,
    trailing: Vec<NodeId>,
}

impl Document {
    pub(crate) fn from_parts(
        arena: NodeArena,
        prolog: Vec<NodeId>,
        root: NodeId,
        trailing: Vec<NodeId>,
    ) -> Self {
        Self {
            arena,
            prolog,
            root,
            trailing,
        }
    }

    /// Parses an XML string into a `Document` with default options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed.
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        crate::parser::parse_str(input)
    }

    /// Parses raw bytes, detecting the encoding from a byte order mark or
    /// the XML declaration. See [`crate::encoding::decode_to_utf8`].
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes cannot be decoded or the decoded
    /// text is not well-formed. Decoding failures are reported as
    /// [`ErrorKind::MalformedTag`] at offset 0.
    ///
    /// ```
    /// use smallxml::Document;
    ///
    /// let doc = Document::parse_bytes(b"\xEF\xBB\xBF<root/>").unwrap();
    /// assert_eq!(doc.name(doc.root_node()), Some("root"));
    /// ```
    pub fn parse_bytes(input: &[u8]) -> Result<Self, ParseError> {
        let text = decode_to_utf8(input).map_err(|e| {
            ParseError::new(ErrorKind::MalformedTag, e.to_string(), SourceLocation::default())
        })?;
        crate::parser::parse_str(&text)
    }

    /// Nodes before the root element, in document order.
    #[must_use]
    pub fn prolog_nodes(&self) -> &[NodeId] {
        &self.prolog
    }

    /// The root element.
    #[must_use]
    pub fn root_node(&self) -> NodeId {
        self.root
    }

    /// Nodes after the root element, in document order.
    #[must_use]
    pub fn trailing_nodes(&self) -> &[NodeId] {
        &self.trailing
    }

    /// Returns the `NodeData` for a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a different document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        self.arena.node(id)
    }

    /// Returns the kind and payload of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Returns the nesting level of a node (root element = 0).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> u32 {
        self.node(id).depth
    }

    /// Tag name for elements, target for processing instructions.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Tag { name, .. } | NodeKind::ProcessingInstruction { target: name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// The literal content of a leaf node.
    ///
    /// Text, comment and CDATA nodes return their content, processing
    /// instructions their body, doctypes their raw declaration. Elements
    /// return `None`; use [`text_content`](Self::text_content) for those.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text { content }
            | NodeKind::Comment { content }
            | NodeKind::CData { content } => Some(content),
            NodeKind::ProcessingInstruction { data, .. } => Some(data),
            NodeKind::DocumentType { declaration } => Some(declaration),
            NodeKind::Tag { .. } => None,
        }
    }

    /// Concatenated text and CDATA content of a node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        for node in self.walk(id) {
            if let NodeKind::Text { content } | NodeKind::CData { content } = self.kind(node) {
                result.push_str(content);
            }
        }
        result
    }

    /// Attributes of a tag in source order; empty for other nodes.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.kind(id) {
            NodeKind::Tag { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Looks up an attribute by name. Absence is `None`, never an error.
    #[must_use]
    pub fn find_attribute(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.attributes(id).iter().find(|a| a.name == name)
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.find_attribute(id, name).map(|a| a.value.as_str())
    }

    // --- Navigation ---

    /// Returns the parent element of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the direct children of a node in document
    /// order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns the direct children of a node that pass `filter`.
    pub fn children_filtered(
        &self,
        id: NodeId,
        filter: NodeFilter,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(move |&child| filter.matches(self.kind(child)))
    }

    /// Returns an iterator over a node and its ancestors, walking up to the
    /// root element.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Pre-order depth-first traversal starting at (and including) `id`.
    ///
    /// Every node in the subtree is produced exactly once, each before its
    /// children, siblings in document order.
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        Walk {
            doc: self,
            start: id,
            next: Some(id),
        }
    }

    /// Tag names from the root element down to `id`, inclusive.
    ///
    /// Non-element nodes contribute no segment of their own, so a text node
    /// reports the path of its enclosing element. Top-level comments,
    /// processing instructions and doctypes have an empty path.
    #[must_use]
    pub fn path_segments(&self, id: NodeId) -> Vec<&str> {
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .filter_map(|node| match self.kind(node) {
                NodeKind::Tag { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        segments.reverse();
        segments
    }

    /// Slash-separated [`path_segments`](Self::path_segments), e.g.
    /// `"movies/movie/title"`.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        self.path_segments(id).join("/")
    }

    /// Returns the total number of nodes in the document.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over a subtree, starting node included.
pub struct Walk<'a> {
    doc: &'a Document,
    start: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        // Climb until a node with an unvisited sibling, never leaving the
        // subtree rooted at `start`.
        let mut node = current;
        loop {
            if node == self.start {
                self.next = None;
                return Some(current);
            }
            if let Some(sibling) = self.doc.next_sibling(node) {
                self.next = Some(sibling);
                return Some(current);
            }
            match self.doc.parent(node) {
                Some(parent) => node = parent,
                None => {
                    self.next = None;
                    return Some(current);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> NodeKind {
        NodeKind::Tag {
            name: name.to_string(),
            attributes: vec![],
        }
    }

    fn text(content: &str) -> NodeKind {
        NodeKind::Text {
            content: content.to_string(),
        }
    }

    /// Builds `<p>hello <b>world</b></p>` by hand.
    fn sample() -> (Document, [NodeId; 4]) {
        let mut arena = NodeArena::default();
        let p = arena.create_node(tag("p"), 0);
        let hello = arena.create_node(text("hello "), 1);
        let b = arena.create_node(tag("b"), 1);
        let world = arena.create_node(text("world"), 2);
        arena.append_child(p, hello);
        arena.append_child(p, b);
        arena.append_child(b, world);
        (
            Document::from_parts(arena, vec![], p, vec![]),
            [p, hello, b, world],
        )
    }

    #[test]
    fn test_node_id_round_trips_index() {
        assert_eq!(NodeId::from_index(0).as_index(), 0);
        assert_eq!(NodeId::from_index(41).as_index(), 41);
    }

    #[test]
    fn test_append_links_siblings() {
        let (doc, [p, hello, b, _]) = sample();
        assert_eq!(doc.first_child(p), Some(hello));
        assert_eq!(doc.last_child(p), Some(b));
        assert_eq!(doc.next_sibling(hello), Some(b));
        assert_eq!(doc.prev_sibling(b), Some(hello));
        assert_eq!(doc.next_sibling(b), None);
        assert_eq!(doc.parent(b), Some(p));
        assert_eq!(doc.parent(p), None);
    }

    #[test]
    fn test_children_iterator() {
        let (doc, [p, hello, b, world]) = sample();
        assert_eq!(doc.children(p).collect::<Vec<_>>(), vec![hello, b]);
        assert_eq!(doc.children(b).collect::<Vec<_>>(), vec![world]);
        assert_eq!(doc.children(world).count(), 0);
    }

    #[test]
    fn test_children_filtered() {
        let (doc, [p, _, b, _]) = sample();
        assert_eq!(
            doc.children_filtered(p, NodeFilter::Tag).collect::<Vec<_>>(),
            vec![b]
        );
        assert_eq!(doc.children_filtered(p, NodeFilter::Comment).count(), 0);
    }

    #[test]
    fn test_ancestors_iterator() {
        let (doc, [p, _, b, world]) = sample();
        assert_eq!(doc.ancestors(world).collect::<Vec<_>>(), vec![world, b, p]);
    }

    #[test]
    fn test_walk_is_preorder() {
        let (doc, [p, hello, b, world]) = sample();
        assert_eq!(doc.walk(p).collect::<Vec<_>>(), vec![p, hello, b, world]);
    }

    #[test]
    fn test_walk_stays_inside_subtree() {
        let (doc, [_, hello, b, world]) = sample();
        assert_eq!(doc.walk(b).collect::<Vec<_>>(), vec![b, world]);
        assert_eq!(doc.walk(hello).collect::<Vec<_>>(), vec![hello]);
    }

    #[test]
    fn test_text_content() {
        let (doc, [p, _, b, _]) = sample();
        assert_eq!(doc.text_content(p), "hello world");
        assert_eq!(doc.text_content(b), "world");
    }

    #[test]
    fn test_path() {
        let (doc, [p, hello, b, world]) = sample();
        assert_eq!(doc.path(p), "p");
        assert_eq!(doc.path(b), "p/b");
        assert_eq!(doc.path(world), "p/b");
        assert_eq!(doc.path_segments(hello), vec!["p"]);
    }

    #[test]
    fn test_find_attribute() {
        let mut arena = NodeArena::default();
        let div = arena.create_node(
            NodeKind::Tag {
                name: "div".to_string(),
                attributes: vec![Attribute::new("id", "main"), Attribute::new("class", "x")],
            },
            0,
        );
        let doc = Document::from_parts(arena, vec![], div, vec![]);

        assert_eq!(
            doc.find_attribute(div, "id"),
            Some(&Attribute::new("id", "main"))
        );
        assert_eq!(doc.attribute(div, "class"), Some("x"));
        assert_eq!(doc.find_attribute(div, "missing"), None);
        assert_eq!(doc.attributes(div).len(), 2);
    }

    #[test]
    fn test_leaf_accessors() {
        let mut arena = NodeArena::default();
        let root = arena.create_node(tag("r"), 0);
        let pi = arena.create_node(
            NodeKind::ProcessingInstruction {
                target: "xml".to_string(),
                data: "version=\"1.0\"".to_string(),
            },
            0,
        );
        let doc = Document::from_parts(arena, vec![pi], root, vec![]);

        assert_eq!(doc.name(pi), Some("xml"));
        assert_eq!(doc.text(pi), Some("version=\"1.0\""));
        assert_eq!(doc.text(root), None);
        assert_eq!(doc.prolog_nodes(), &[pi]);
        assert_eq!(doc.path(pi), "");
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn test_document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document>();
    }
}
