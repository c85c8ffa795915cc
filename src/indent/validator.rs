//! Actual-vs-expected comparison and fix synthesis
//!
//! The resolver hands over one check per validated line. Leading
//! whitespace must consist solely of the configured indent character; a
//! foreign character is a character-mismatch diagnostic, a wrong count a
//! magnitude mismatch. Fixes replace the leading-whitespace span, except
//! for multiline block comments which are re-indented in one combined
//! replacement so the comment body stays well-formed.

use crate::config::IndentOptions;
use crate::diagnostic::{Diagnostic, Fix, Location};
use crate::document::TemplateDocument;
use crate::indent::resolver::LineCheck;
use crate::token::{TokenId, TokenKind};
use regex::Regex;
use std::sync::OnceLock;

/// Leading shape of a block-comment continuation line.
fn continuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ \t]*\*").unwrap())
}

pub struct Validator<'a> {
    doc: &'a TemplateDocument,
    options: &'a IndentOptions,
}

impl<'a> Validator<'a> {
    pub fn new(doc: &'a TemplateDocument, options: &'a IndentOptions) -> Self {
        Self { doc, options }
    }

    pub fn validate(&self, checks: &[LineCheck]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for check in checks {
            if let Some(diag) = self.validate_check(check) {
                diagnostics.push(diag);
            }
        }
        diagnostics
    }

    fn validate_check(&self, check: &LineCheck) -> Option<Diagnostic> {
        let token = self.doc.tokens().get(check.token);
        let line = token.start.line;
        let line_start = self.doc.lines().line_start(line);
        let leading = &self.doc.source()[line_start..token.span.start];
        let indent_char = self.options.indent.indent_char();

        // Recovery edge: a token that does not open its line cannot be
        // re-indented without corrupting what precedes it.
        if leading.chars().any(|c| !c.is_whitespace()) {
            return None;
        }

        let fixable = check.alternatives.is_empty();

        if let Some(bad) = leading.chars().find(|&c| c != indent_char) {
            let message = format!(
                "Expected {} character, but found {} character.",
                self.options.indent.unit_name(),
                char_name(bad)
            );
            return Some(self.report(check, line, line_start, leading, check.expected, &message, fixable));
        }

        let actual = leading.chars().count();
        if actual == check.expected || check.alternatives.contains(&actual) {
            return None;
        }

        let unit = self.options.indent.unit_name();
        let message = format!(
            "Expected indentation of {} {}{} but found {} {}{}.",
            check.expected,
            unit,
            plural(check.expected),
            actual,
            unit,
            plural(actual),
        );
        Some(self.report(check, line, line_start, leading, check.expected, &message, fixable))
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        check: &LineCheck,
        line: usize,
        line_start: usize,
        leading: &str,
        expected: usize,
        message: &str,
        fixable: bool,
    ) -> Diagnostic {
        // The report covers the leading-whitespace span.
        let location = Location::new(self.doc.path().to_path_buf(), line, 1)
            .with_length(leading.chars().count());

        let mut diag = Diagnostic::new(
            "indent",
            self.options.severity,
            message,
            location,
        )
        .with_source_line(self.doc.line_text(line));

        if fixable {
            diag = diag.with_fix(self.make_fix(check.token, line_start, expected));
        }
        diag
    }

    /// Build the whitespace-replacement fix for a line.
    fn make_fix(&self, token_id: TokenId, line_start: usize, expected: usize) -> Fix {
        let token = self.doc.tokens().get(token_id);
        let indent: String = std::iter::repeat(self.options.indent.indent_char())
            .take(expected)
            .collect();

        if token.kind == TokenKind::BlockComment && token.is_multiline() {
            let text = self.doc.token_text(token_id);
            let mut lines = text.split('\n');
            let first_line = lines.next().unwrap_or("");
            let rest: Vec<&str> = lines.collect();
            if rest.iter().all(|l| continuation_re().is_match(l)) {
                let mut replacement = format!("{}{}", indent, first_line);
                for continuation in rest {
                    replacement.push('\n');
                    replacement.push_str(&indent);
                    replacement.push(' ');
                    replacement.push_str(continuation.trim_start());
                }
                return Fix::replace(
                    "Re-indent comment",
                    line_start,
                    token.span.end,
                    &replacement,
                );
            }
        }

        Fix::replace("Re-indent line", line_start, token.span.start, &indent)
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn char_name(c: char) -> String {
    match c {
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        other => format!("{:?}", other),
    }
}
