//! Token model and position-ordered token queries
//!
//! Tokens come from the external parser and are immutable. Identity is the
//! arena index ([`TokenId`]), which doubles as source order: the store
//! requires its tokens sorted by start offset.

use serde::{Deserialize, Serialize};

/// A byte range into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A line/column pair. Lines are 1-based, columns are 0-based character
/// counts from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Lexical token categories across both embedded grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Markup grammar
    /// `<name`
    TagOpen,
    /// `</name`
    EndTagOpen,
    /// `>`
    TagClose,
    /// `/>`
    SelfClosingTagClose,
    AttributeName,
    /// `=` between attribute name and value
    Equals,
    /// Quoted attribute value literal
    AttributeValue,
    Text,
    /// `<!-- ... -->`
    MarkupComment,
    /// `{{`
    MustacheStart,
    /// `}}`
    MustacheEnd,

    // Expression grammar
    Identifier,
    Keyword,
    Number,
    Str,
    /// Template literal chunk (includes backticks and `${` / `}` edges)
    Template,
    Punctuator,
    LineComment,
    BlockComment,
}

impl TokenKind {
    /// Comment tokens are interleaved in the stream but invisible to most
    /// structural queries.
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::MarkupComment | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// An immutable lexical unit.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub start: Position,
    pub end: Position,
}

impl Token {
    /// Whether this token spans more than one source line.
    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

/// Stable token identity: the arena index into the token store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u32);

impl TokenId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Precomputed line-start offsets for byte-offset to line/column mapping.
#[derive(Debug, Clone)]
pub struct LineTable {
    line_starts: Vec<usize>,
}

impl LineTable {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Number of lines (at least 1, even for an empty source).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of a 1-based line.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(0)
    }

    /// Map a byte offset to a [`Position`] within `source`.
    pub fn position(&self, source: &str, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_start(line);
        let column = source[line_start..offset].chars().count();
        Position { line, column }
    }
}

/// The token arena plus position-ordered queries over it.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Vec<Token>,
}

impl TokenStore {
    /// Build a store. Tokens must be sorted by start offset and
    /// non-overlapping; the caller (document builder) validates this.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (TokenId(i as u32), t))
    }

    /// Index of the first token whose start offset is >= `offset`.
    fn lower_bound(&self, offset: usize) -> usize {
        self.tokens.partition_point(|t| t.span.start < offset)
    }

    /// First token (skipping comments unless `include_comments`) inside a span.
    pub fn first_in(&self, span: Span, include_comments: bool) -> Option<TokenId> {
        let mut i = self.lower_bound(span.start);
        while i < self.tokens.len() && self.tokens[i].span.start < span.end {
            if include_comments || !self.tokens[i].kind.is_comment() {
                return Some(TokenId(i as u32));
            }
            i += 1;
        }
        None
    }

    /// Last token (skipping comments unless `include_comments`) inside a span.
    pub fn last_in(&self, span: Span, include_comments: bool) -> Option<TokenId> {
        let upper = self.lower_bound(span.end);
        let mut i = upper;
        while i > 0 {
            i -= 1;
            let t = &self.tokens[i];
            if t.span.start < span.start {
                break;
            }
            if t.span.end <= span.end && (include_comments || !t.kind.is_comment()) {
                return Some(TokenId(i as u32));
            }
        }
        None
    }

    /// The token after `id` in source order.
    pub fn after(&self, id: TokenId, include_comments: bool) -> Option<TokenId> {
        let mut i = id.index() + 1;
        while i < self.tokens.len() {
            if include_comments || !self.tokens[i].kind.is_comment() {
                return Some(TokenId(i as u32));
            }
            i += 1;
        }
        None
    }

    /// The token before `id` in source order.
    pub fn before(&self, id: TokenId, include_comments: bool) -> Option<TokenId> {
        let mut i = id.index();
        while i > 0 {
            i -= 1;
            if include_comments || !self.tokens[i].kind.is_comment() {
                return Some(TokenId(i as u32));
            }
        }
        None
    }

    /// First token starting at or after a byte offset.
    pub fn at_or_after(&self, offset: usize, include_comments: bool) -> Option<TokenId> {
        let mut i = self.lower_bound(offset);
        while i < self.tokens.len() {
            if include_comments || !self.tokens[i].kind.is_comment() {
                return Some(TokenId(i as u32));
            }
            i += 1;
        }
        None
    }

    /// Last token ending at or before a byte offset.
    pub fn ending_before(&self, offset: usize, include_comments: bool) -> Option<TokenId> {
        let mut i = self.lower_bound(offset);
        while i > 0 {
            i -= 1;
            let t = &self.tokens[i];
            if t.span.end <= offset && (include_comments || !t.kind.is_comment()) {
                return Some(TokenId(i as u32));
            }
        }
        None
    }

    /// Tokens strictly between two tokens, in source order.
    pub fn between(
        &self,
        left: TokenId,
        right: TokenId,
        include_comments: bool,
    ) -> impl Iterator<Item = TokenId> + '_ {
        let from = left.index() + 1;
        let to = right.index().max(from);
        self.tokens[from..to]
            .iter()
            .enumerate()
            .filter(move |(_, t)| include_comments || !t.kind.is_comment())
            .map(move |(i, _)| TokenId((from + i) as u32))
    }

    /// All tokens inside a span, in source order.
    pub fn in_span(
        &self,
        span: Span,
        include_comments: bool,
    ) -> impl Iterator<Item = TokenId> + '_ {
        let from = self.lower_bound(span.start);
        self.tokens[from..]
            .iter()
            .enumerate()
            .take_while(move |(_, t)| t.span.start < span.end)
            .filter(move |(_, t)| include_comments || !t.kind.is_comment())
            .map(move |(i, _)| TokenId((from + i) as u32))
    }
}
