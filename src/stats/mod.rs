//! Node statistics.
//!
//! Counts nodes per kind, tracks the deepest nesting level and collects the
//! distinct `(path, attribute names)` combinations seen on tags. The report
//! format is a fixed-width, dot-leader listing:
//!
//! ```text
//! TagNode Count ..................... 3
//! CommentNode Count ................. 0
//! ...
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::tree::{Document, NodeId, NodeKind};

/// A tag's path (with a trailing `/`) and its attribute names in source
/// order. Ordered by path, then by the attribute sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath {
    /// Tag names from the root element down to this tag, each followed by `/`.
    pub path: String,
    /// Attribute names on the tag.
    pub attributes: Vec<String>,
}

/// Counters for one group of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Number of tag (element) nodes.
    pub tag_nodes: usize,
    /// Number of comment nodes.
    pub comment_nodes: usize,
    /// Number of text nodes, including whitespace-only ones.
    pub text_nodes: usize,
    /// Number of doctype declarations.
    pub doctype_nodes: usize,
    /// Number of CDATA sections.
    pub cdata_nodes: usize,
    /// Number of processing instructions.
    pub pi_nodes: usize,
    /// Greatest depth of any recorded node; the root element is depth 0.
    pub deepest_level: u32,
    paths: BTreeSet<NodePath>,
}

impl NodeStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single node. Children are not visited.
    pub fn update(&mut self, doc: &Document, id: NodeId) {
        match doc.kind(id) {
            NodeKind::Tag { attributes, .. } => {
                self.tag_nodes += 1;
                self.paths.insert(NodePath {
                    path: format!("{}/", doc.path(id)),
                    attributes: attributes.iter().map(|a| a.name.clone()).collect(),
                });
            }
            NodeKind::Text { .. } => self.text_nodes += 1,
            NodeKind::Comment { .. } => self.comment_nodes += 1,
            NodeKind::CData { .. } => self.cdata_nodes += 1,
            NodeKind::ProcessingInstruction { .. } => self.pi_nodes += 1,
            NodeKind::DocumentType { .. } => self.doctype_nodes += 1,
        }
        self.deepest_level = self.deepest_level.max(doc.depth(id));
    }

    /// Records `id` and every node below it.
    pub fn update_subtree(&mut self, doc: &Document, id: NodeId) {
        for node in doc.walk(id) {
            self.update(doc, node);
        }
    }

    /// Distinct tag paths with their attribute sequences, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &NodePath> {
        self.paths.iter()
    }

    fn write_report(&self, f: &mut fmt::Formatter<'_>, with_paths: bool) -> fmt::Result {
        let rows = [
            ("TagNode Count", self.tag_nodes),
            ("CommentNode Count", self.comment_nodes),
            ("NakedTextNode Count", self.text_nodes),
            ("DocumentTypeNode Count", self.doctype_nodes),
            ("CDATANode Count", self.cdata_nodes),
            ("ProcessingInstructionNode Count", self.pi_nodes),
        ];
        for (label, count) in rows {
            writeln!(f, "{} {count}", dot_leader(label))?;
        }
        writeln!(f, "{} {}", dot_leader("DeepestLevel"), self.deepest_level)?;

        if !with_paths || self.paths.is_empty() {
            return Ok(());
        }
        let heading = "Unique Node Path/Attribute instances";
        writeln!(f)?;
        writeln!(f, "{heading}")?;
        writeln!(f, "{}", "-".repeat(heading.len()))?;
        let mut last_path = "";
        for entry in &self.paths {
            if entry.path != last_path {
                writeln!(f, "{}", entry.path)?;
                last_path = &entry.path;
            }
            if !entry.attributes.is_empty() {
                writeln!(f, "... {}", entry.attributes.join(" "))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for NodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_report(f, f.alternate())
    }
}

/// Pads `label` with dots to a fixed column.
fn dot_leader(label: &str) -> String {
    const WIDTH: usize = 35;
    let dots = WIDTH.saturating_sub(label.len() + 1).max(3);
    format!("{label} {}", ".".repeat(dots))
}

/// Statistics for the prolog and for the element tree of a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentStats {
    /// Nodes before the root element.
    pub prolog: NodeStats,
    /// The root element and everything under it.
    pub content: NodeStats,
    show_paths: bool,
}

impl DocumentStats {
    /// Gathers prolog stats over the prolog nodes and content stats over
    /// the whole tree under the root element.
    #[must_use]
    pub fn collect(doc: &Document) -> Self {
        let mut prolog = NodeStats::new();
        for &id in doc.prolog_nodes() {
            prolog.update(doc, id);
        }
        let mut content = NodeStats::new();
        content.update_subtree(doc, doc.root_node());
        log::debug!(
            target: "smallxml::stats",
            "collected {} prolog and {} content tags",
            prolog.tag_nodes,
            content.tag_nodes
        );
        Self {
            prolog,
            content,
            show_paths: false,
        }
    }

    /// Includes the unique path listing in the report.
    #[must_use]
    pub fn with_paths(mut self, yes: bool) -> Self {
        self.show_paths = yes;
        self
    }
}

impl fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prolog Portion")?;
        writeln!(f, "--------------")?;
        self.prolog.write_report(f, self.show_paths)?;
        writeln!(f)?;
        writeln!(f, "Content Portion")?;
        writeln!(f, "---------------")?;
        self.content.write_report(f, self.show_paths)
    }
}
