//! Tree builder.
//!
//! Consumes scanner tokens and assembles a [`Document`] using an explicit
//! stack of open tags. Leaves attach to the tag on top of the stack; with
//! an empty stack they become top-level nodes before or after the root
//! element.

use crate::error::{ErrorKind, ParseError, SourceLocation};
use crate::tree::{Document, NodeArena, NodeId, NodeKind};

use super::scanner::{Token, TokenKind};
use super::ParseOptions;

pub(crate) struct TreeBuilder {
    arena: NodeArena,
    /// Open tags, innermost last, with the location of each start tag.
    stack: Vec<(NodeId, SourceLocation)>,
    prolog: Vec<NodeId>,
    root: Option<NodeId>,
    trailing: Vec<NodeId>,
    no_blanks: bool,
    max_depth: u32,
}

impl TreeBuilder {
    pub fn new(options: &ParseOptions, size_hint: usize) -> Self {
        Self {
            // Rough guess: one node per 16 bytes of markup.
            arena: NodeArena::with_capacity(size_hint / 16 + 1),
            stack: Vec::new(),
            prolog: Vec::new(),
            root: None,
            trailing: Vec::new(),
            no_blanks: options.no_blanks,
            max_depth: options.max_depth,
        }
    }

    /// Applies one token to the tree under construction.
    pub fn push_token(&mut self, token: Token) -> Result<(), ParseError> {
        let Token { kind, location } = token;
        match kind {
            TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let id = self.open_tag(NodeKind::Tag { name, attributes }, location)?;
                if !self_closing {
                    self.stack.push((id, location));
                }
                Ok(())
            }
            TokenKind::EndTag { name } => self.close_tag(&name, location),
            TokenKind::Text(content) => {
                self.add_leaf(NodeKind::Text { content });
                Ok(())
            }
            TokenKind::Comment(content) => {
                self.add_leaf(NodeKind::Comment { content });
                Ok(())
            }
            TokenKind::CData(content) => {
                self.add_leaf(NodeKind::CData { content });
                Ok(())
            }
            TokenKind::ProcessingInstruction { target, data } => {
                self.add_leaf(NodeKind::ProcessingInstruction { target, data });
                Ok(())
            }
            TokenKind::Doctype(declaration) => {
                if let Some(&(open, _)) = self.stack.last() {
                    return Err(ParseError::new(
                        ErrorKind::MalformedTag,
                        format!(
                            "doctype declaration inside element <{}>",
                            self.tag_name(open)
                        ),
                        location,
                    ));
                }
                self.add_leaf(NodeKind::DocumentType { declaration });
                Ok(())
            }
        }
    }

    fn open_tag(&mut self, kind: NodeKind, location: SourceLocation) -> Result<NodeId, ParseError> {
        let Some(&(parent, _)) = self.stack.last() else {
            if let Some(root) = self.root {
                return Err(ParseError::new(
                    ErrorKind::MultipleRootElements,
                    format!(
                        "second top-level element after root element <{}>",
                        self.tag_name(root)
                    ),
                    location,
                ));
            }
            let id = self.arena.create_node(kind, 0);
            log::debug!(target: "smallxml::parser", "root element at {location}");
            self.root = Some(id);
            return Ok(id);
        };

        let depth = self.arena.node(parent).depth + 1;
        if depth > self.max_depth {
            return Err(ParseError::new(
                ErrorKind::LimitExceeded,
                format!("maximum nesting depth exceeded ({})", self.max_depth),
                location,
            ));
        }
        let id = self.arena.create_node(kind, depth);
        self.arena.append_child(parent, id);
        Ok(id)
    }

    fn close_tag(&mut self, name: &str, location: SourceLocation) -> Result<(), ParseError> {
        let Some((open, _)) = self.stack.pop() else {
            return Err(ParseError::new(
                ErrorKind::UnexpectedCloseTag,
                format!("close tag </{name}> has no matching open tag"),
                location,
            ));
        };
        let open_name = self.tag_name(open);
        if open_name != name {
            return Err(ParseError::new(
                ErrorKind::MismatchedCloseTag,
                format!("expected </{open_name}>, found </{name}>"),
                location,
            ));
        }
        Ok(())
    }

    fn add_leaf(&mut self, kind: NodeKind) {
        match self.stack.last() {
            Some(&(parent, _)) => {
                if self.no_blanks && kind.is_blank_text() {
                    return;
                }
                let depth = self.arena.node(parent).depth + 1;
                let id = self.arena.create_node(kind, depth);
                self.arena.append_child(parent, id);
            }
            None => {
                // Whitespace between top-level constructs is not content.
                if kind.is_blank_text() {
                    return;
                }
                let id = self.arena.create_node(kind, 0);
                if self.root.is_none() {
                    self.prolog.push(id);
                } else {
                    self.trailing.push(id);
                }
            }
        }
    }

    fn tag_name(&self, id: NodeId) -> &str {
        match &self.arena.node(id).kind {
            NodeKind::Tag { name, .. } => name,
            _ => "",
        }
    }

    /// Checks the end-of-input conditions and produces the document.
    pub fn finish(self, end: SourceLocation) -> Result<Document, ParseError> {
        if let Some(&(open, opened_at)) = self.stack.last() {
            return Err(ParseError::new(
                ErrorKind::UnclosedTag,
                format!(
                    "<{}> opened at {opened_at} is never closed",
                    self.tag_name(open)
                ),
                end,
            ));
        }
        let Some(root) = self.root else {
            return Err(ParseError::new(
                ErrorKind::NoRootElement,
                "document has no root element",
                end,
            ));
        };
        Ok(Document::from_parts(
            self.arena,
            self.prolog,
            root,
            self.trailing,
        ))
    }
}
