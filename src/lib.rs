//! sleet - indentation linter for component-template documents
//!
//! Validates and fixes the indentation of single-file-component templates:
//! an HTML-like markup grammar embedding a JS-like expression grammar.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> indent::check -> OffsetBuilder -> LineResolver -> Validator
//! ```
//!
//! Parsing is not part of this crate. The external parser supplies a
//! [`document::TemplateDocument`] (source text, token stream, AST arena,
//! top-level units), either through [`document::DocumentBuilder`] or as a
//! JSON document file. The engine assigns every token a symbolic indent
//! relative to its structural base token, resolves each line's expected
//! indentation through that offset graph, and reports deviations as
//! fixable diagnostics.

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod engine;
pub mod fixer;
pub mod indent;
pub mod output;
pub mod token;

// Re-export main types
pub use ast::{Node, NodeId, NodeKind};
pub use config::{CloseBracket, Config, ConfigError, IndentOptions, IndentUnit};
pub use diagnostic::{Diagnostic, Fix, Location, Severity};
pub use document::{DocumentBuilder, DocumentError, TemplateDocument};
pub use engine::{Engine, LintResult};
pub use fixer::{FixOutcome, FixedSource, Fixer};
pub use output::{JsonFormatter, OutputFormatter, TextFormatter};
pub use token::{Position, Span, Token, TokenId, TokenKind, TokenStore};
