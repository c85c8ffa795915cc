//! AST node model over both embedded grammars
//!
//! Nodes live in an arena owned by the document; structural links are arena
//! indices. The kind enum is closed: constructs the engine does not model
//! arrive as [`NodeKind::Unknown`] and are routed to the ignore mechanism.

use crate::token::{Span, TokenId};
use serde::{Deserialize, Serialize};

/// Stable node identity: the arena index into the document's node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node kinds of the markup grammar, the expression grammar, and the
/// statement subset used inside handler/script regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    // ----- markup -----
    Element {
        name: String,
        start_tag: NodeId,
        children: Vec<NodeId>,
        end_tag: Option<NodeId>,
    },
    StartTag {
        attributes: Vec<NodeId>,
        self_closing: bool,
    },
    EndTag,
    Attribute {
        key: TokenId,
        eq: Option<TokenId>,
        value: Option<NodeId>,
    },
    /// A `{{ ... }}` interpolation or a quoted directive value.
    ExpressionContainer {
        open: Option<TokenId>,
        expr: Option<NodeId>,
        close: Option<TokenId>,
    },
    Text,

    // ----- expressions -----
    Identifier,
    Literal,
    TemplateLiteral {
        expressions: Vec<NodeId>,
    },
    Paren {
        expr: NodeId,
    },
    ArrayExpression {
        /// `None` entries are sparse holes.
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    Property {
        key: NodeId,
        /// `None` for shorthand properties.
        value: Option<NodeId>,
    },
    SpreadElement {
        argument: NodeId,
    },
    UnaryExpression {
        argument: NodeId,
    },
    UpdateExpression {
        argument: NodeId,
        prefix: bool,
    },
    BinaryExpression {
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        left: NodeId,
        right: NodeId,
    },
    AssignmentExpression {
        left: NodeId,
        right: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
    },
    SequenceExpression {
        expressions: Vec<NodeId>,
    },
    ArrowFunction {
        params: Vec<NodeId>,
        body: NodeId,
    },
    FunctionExpression {
        params: Vec<NodeId>,
        body: NodeId,
    },

    // ----- statements -----
    /// An embedded script region (a top-level unit).
    Program {
        body: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForInStatement {
        left: NodeId,
        right: NodeId,
        /// `for..of` when true, `for..in` otherwise.
        of: bool,
        body: NodeId,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        body: NodeId,
        test: NodeId,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    SwitchCase {
        test: Option<NodeId>,
        body: Vec<NodeId>,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    BreakStatement,
    ContinueStatement,
    VariableDeclaration {
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },

    /// Fallback for constructs the engine does not model.
    Unknown,
}

impl NodeKind {
    /// Kind name as matched by ignore patterns and shown in logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Element { .. } => "Element",
            NodeKind::StartTag { .. } => "StartTag",
            NodeKind::EndTag => "EndTag",
            NodeKind::Attribute { .. } => "Attribute",
            NodeKind::ExpressionContainer { .. } => "ExpressionContainer",
            NodeKind::Text => "Text",
            NodeKind::Identifier => "Identifier",
            NodeKind::Literal => "Literal",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::Paren { .. } => "Paren",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::ArrowFunction { .. } => "ArrowFunction",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::Program { .. } => "Program",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::Unknown => "Unknown",
        }
    }

    /// Child node ids in structural order (used for the traversal and for
    /// parent-link derivation).
    pub fn child_ids(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Element {
                start_tag,
                children,
                end_tag,
                ..
            } => {
                let mut ids = vec![*start_tag];
                ids.extend(children.iter().copied());
                ids.extend(end_tag.iter().copied());
                ids
            }
            NodeKind::StartTag { attributes, .. } => attributes.clone(),
            NodeKind::Attribute { value, .. } => value.iter().copied().collect(),
            NodeKind::ExpressionContainer { expr, .. } => expr.iter().copied().collect(),
            NodeKind::TemplateLiteral { expressions } => expressions.clone(),
            NodeKind::Paren { expr } => vec![*expr],
            NodeKind::ArrayExpression { elements } => elements.iter().flatten().copied().collect(),
            NodeKind::ObjectExpression { properties } => properties.clone(),
            NodeKind::Property { key, value } => {
                let mut ids = vec![*key];
                ids.extend(value.iter().copied());
                ids
            }
            NodeKind::SpreadElement { argument }
            | NodeKind::UnaryExpression { argument }
            | NodeKind::UpdateExpression { argument, .. } => vec![*argument],
            NodeKind::BinaryExpression { left, right }
            | NodeKind::LogicalExpression { left, right }
            | NodeKind::AssignmentExpression { left, right } => vec![*left, *right],
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![*test, *consequent, *alternate],
            NodeKind::CallExpression { callee, arguments }
            | NodeKind::NewExpression { callee, arguments } => {
                let mut ids = vec![*callee];
                ids.extend(arguments.iter().copied());
                ids
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => vec![*object, *property],
            NodeKind::SequenceExpression { expressions } => expressions.clone(),
            NodeKind::ArrowFunction { params, body }
            | NodeKind::FunctionExpression { params, body } => {
                let mut ids = params.clone();
                ids.push(*body);
                ids
            }
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => body.clone(),
            NodeKind::ExpressionStatement { expression } => vec![*expression],
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                let mut ids = vec![*test, *consequent];
                ids.extend(alternate.iter().copied());
                ids
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let mut ids: Vec<NodeId> = Vec::new();
                ids.extend(init.iter().copied());
                ids.extend(test.iter().copied());
                ids.extend(update.iter().copied());
                ids.push(*body);
                ids
            }
            NodeKind::ForInStatement {
                left, right, body, ..
            } => vec![*left, *right, *body],
            NodeKind::WhileStatement { test, body } => vec![*test, *body],
            NodeKind::DoWhileStatement { body, test } => vec![*body, *test],
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                let mut ids = vec![*discriminant];
                ids.extend(cases.iter().copied());
                ids
            }
            NodeKind::SwitchCase { test, body } => {
                let mut ids: Vec<NodeId> = Vec::new();
                ids.extend(test.iter().copied());
                ids.extend(body.iter().copied());
                ids
            }
            NodeKind::ReturnStatement { argument } => argument.iter().copied().collect(),
            NodeKind::VariableDeclaration { declarations } => declarations.clone(),
            NodeKind::VariableDeclarator { id, init } => {
                let mut ids = vec![*id];
                ids.extend(init.iter().copied());
                ids
            }
            NodeKind::EndTag
            | NodeKind::Text
            | NodeKind::Identifier
            | NodeKind::Literal
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::Unknown => Vec::new(),
        }
    }

    /// Whether this kind is a statement.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::ExpressionStatement { .. }
                | NodeKind::BlockStatement { .. }
                | NodeKind::IfStatement { .. }
                | NodeKind::ForStatement { .. }
                | NodeKind::ForInStatement { .. }
                | NodeKind::WhileStatement { .. }
                | NodeKind::DoWhileStatement { .. }
                | NodeKind::SwitchStatement { .. }
                | NodeKind::ReturnStatement { .. }
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::VariableDeclaration { .. }
        )
    }
}

/// An AST node: kind plus source span. Parent links are derived when the
/// document is built and are not part of the interchange format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub span: Span,
    #[serde(skip)]
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            parent: None,
        }
    }
}
