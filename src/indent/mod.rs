//! The offset-graph indentation engine
//!
//! Validation of one document runs in two phases over state scoped to the
//! pass:
//!
//! 1. [`builder::OffsetBuilder`] walks every top-level unit and registers
//!    an offset entry per token — "this token sits N units from that one".
//! 2. [`resolver::LineResolver`] walks the token stream line by line,
//!    resolves each line's expected indent through the offset graph, and
//!    [`validator::Validator`] compares it against the actual whitespace,
//!    emitting diagnostics with replacement fixes.
//!
//! Anything the builder does not understand is routed to an ignore set and
//! never validated; a file with unknown constructs yields no false
//! positives for them.

pub mod builder;
pub mod node_list;
pub mod offsets;
pub mod resolver;
pub mod validator;

use crate::config::IndentOptions;
use crate::diagnostic::Diagnostic;
use crate::document::TemplateDocument;

/// Check one document's indentation.
pub fn check(doc: &TemplateDocument, options: &IndentOptions) -> Vec<Diagnostic> {
    if doc.tokens().is_empty() {
        return Vec::new();
    }
    let table = builder::OffsetBuilder::new(doc, options).build();
    let checks = resolver::LineResolver::new(doc, options, &table).resolve();
    validator::Validator::new(doc, options).validate(&checks)
}
