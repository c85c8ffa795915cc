//! Parsed-document model and interchange format
//!
//! The engine does not parse source text; an external parser hands it a
//! [`TemplateDocument`] — source buffer, token stream, node arena, and the
//! list of top-level units — either through [`DocumentBuilder`] or as a
//! JSON document file.

use crate::ast::{Node, NodeId, NodeKind};
use crate::token::{LineTable, Span, Token, TokenId, TokenKind, TokenStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error constructing or loading a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token {index} is out of order or overlaps its neighbor")]
    TokenOrder { index: usize },

    #[error("token {index} spans {start}..{end}, outside the source buffer")]
    TokenBounds {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("node {index} spans {start}..{end}, outside the source buffer")]
    NodeBounds {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("node {index} references node {child} which does not exist")]
    NodeLink { index: usize, child: u32 },

    #[error("root {root} does not exist")]
    RootLink { root: u32 },
}

/// Wire form of a token: positions are derived from the source on build.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawToken {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// Wire form of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRepr {
    path: PathBuf,
    source: String,
    tokens: Vec<RawToken>,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

/// One source file's worth of lint input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DocumentRepr", into = "DocumentRepr")]
pub struct TemplateDocument {
    path: PathBuf,
    source: String,
    tokens: TokenStore,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    lines: LineTable,
}

impl TemplateDocument {
    /// Load a document from a JSON file produced by the external parser.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Path of the original source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level units in source order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn lines(&self) -> &LineTable {
        &self.lines
    }

    /// Source text of a token.
    pub fn token_text(&self, id: TokenId) -> &str {
        let span = self.tokens.get(id).span;
        &self.source[span.start..span.end]
    }

    /// Text of a 1-based source line, without its terminator.
    pub fn line_text(&self, line: usize) -> &str {
        let start = self.lines.line_start(line);
        let rest = &self.source[start..];
        match rest.find('\n') {
            Some(end) => rest[..end].trim_end_matches('\r'),
            None => rest,
        }
    }

    /// First non-comment token of a node.
    pub fn first_token_of(&self, id: NodeId) -> Option<TokenId> {
        self.tokens.first_in(self.node(id).span, false)
    }

    /// Last non-comment token of a node.
    pub fn last_token_of(&self, id: NodeId) -> Option<TokenId> {
        self.tokens.last_in(self.node(id).span, false)
    }
}

impl TryFrom<DocumentRepr> for TemplateDocument {
    type Error = DocumentError;

    fn try_from(repr: DocumentRepr) -> Result<Self, Self::Error> {
        let mut builder = DocumentBuilder::new(repr.path, repr.source);
        for raw in repr.tokens {
            builder.push_token(raw.kind, raw.start, raw.end);
        }
        for node in repr.nodes {
            builder.push_node(node.kind, node.span);
        }
        for root in repr.roots {
            builder.add_root(root);
        }
        builder.build()
    }
}

impl From<TemplateDocument> for DocumentRepr {
    fn from(doc: TemplateDocument) -> Self {
        DocumentRepr {
            path: doc.path,
            source: doc.source,
            tokens: doc
                .tokens
                .iter()
                .map(|(_, t)| RawToken {
                    kind: t.kind,
                    start: t.span.start,
                    end: t.span.end,
                })
                .collect(),
            nodes: doc.nodes,
            roots: doc.roots,
        }
    }
}

/// Incremental constructor for [`TemplateDocument`].
///
/// Tokens must be pushed in source order; `build` validates ordering and
/// link integrity and derives line/column data and parent links.
#[derive(Debug)]
pub struct DocumentBuilder {
    path: PathBuf,
    source: String,
    tokens: Vec<RawToken>,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl DocumentBuilder {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            tokens: Vec::new(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Append a token; returns its id.
    pub fn push_token(&mut self, kind: TokenKind, start: usize, end: usize) -> TokenId {
        let id = TokenId(self.tokens.len() as u32);
        self.tokens.push(RawToken { kind, start, end });
        id
    }

    /// Append a node; returns its id.
    pub fn push_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, span));
        id
    }

    /// Register a top-level unit.
    pub fn add_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Validate and finish the document.
    pub fn build(self) -> Result<TemplateDocument, DocumentError> {
        let lines = LineTable::new(&self.source);
        let len = self.source.len();

        let mut tokens = Vec::with_capacity(self.tokens.len());
        let mut prev_end = 0usize;
        for (index, raw) in self.tokens.iter().enumerate() {
            if raw.start > raw.end || raw.end > len {
                return Err(DocumentError::TokenBounds {
                    index,
                    start: raw.start,
                    end: raw.end,
                });
            }
            if raw.start < prev_end {
                return Err(DocumentError::TokenOrder { index });
            }
            prev_end = raw.end;
            tokens.push(Token {
                kind: raw.kind,
                span: Span::new(raw.start, raw.end),
                start: lines.position(&self.source, raw.start),
                end: lines.position(&self.source, raw.end),
            });
        }

        let mut nodes = self.nodes;
        let node_count = nodes.len();
        for index in 0..node_count {
            let span = nodes[index].span;
            if span.start > span.end || span.end > len {
                return Err(DocumentError::NodeBounds {
                    index,
                    start: span.start,
                    end: span.end,
                });
            }
            for child in nodes[index].kind.child_ids() {
                if child.index() >= node_count {
                    return Err(DocumentError::NodeLink {
                        index,
                        child: child.0,
                    });
                }
                nodes[child.index()].parent = Some(NodeId(index as u32));
            }
        }

        for root in &self.roots {
            if root.index() >= node_count {
                return Err(DocumentError::RootLink { root: root.0 });
            }
        }

        Ok(TemplateDocument {
            path: self.path,
            source: self.source,
            tokens: TokenStore::new(tokens),
            nodes,
            roots: self.roots,
            lines,
        })
    }
}
