//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::LintResult;
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show source context
    pub show_source: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        // Group diagnostics by file, in stable path order
        let mut by_file: BTreeMap<PathBuf, Vec<&Diagnostic>> = BTreeMap::new();
        for diag in &result.diagnostics {
            by_file
                .entry(diag.location.file.clone())
                .or_default()
                .push(diag);
        }

        for (file, diagnostics) in &by_file {
            if self.colored {
                output.push_str(&format!("{}\n", file.display().to_string().underline()));
            } else {
                output.push_str(&format!("{}\n", file.display()));
            }
            for diag in diagnostics {
                output.push_str(&self.format_diagnostic(diag));
                output.push('\n');
            }
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&format!(
                "{} {} processed",
                result.files_processed,
                if result.files_processed == 1 {
                    "file"
                } else {
                    "files"
                }
            ));

            let mut counts = Vec::new();
            if result.error_count > 0 {
                let s = format!(
                    "{} {}",
                    result.error_count,
                    if result.error_count == 1 {
                        "error"
                    } else {
                        "errors"
                    }
                );
                counts.push(if self.colored { s.red().to_string() } else { s });
            }
            if result.warning_count > 0 {
                let s = format!(
                    "{} {}",
                    result.warning_count,
                    if result.warning_count == 1 {
                        "warning"
                    } else {
                        "warnings"
                    }
                );
                counts.push(if self.colored {
                    s.yellow().to_string()
                } else {
                    s
                });
            }
            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');
            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut line = format!(
            "  {}:{} {} {} {}",
            diag.location.line,
            diag.location.column,
            self.severity_str(diag.severity),
            if self.colored {
                diag.rule_id.dimmed().to_string()
            } else {
                diag.rule_id.clone()
            },
            diag.message
        );

        if self.show_source {
            if let Some(source) = &diag.source_line {
                line.push_str(&format!("\n      {}", source));
            }
        }
        if diag.has_fix() {
            let marker = if self.colored {
                "[fixable]".green().to_string()
            } else {
                "[fixable]".to_string()
            };
            line.push_str(&format!(" {}", marker));
        }
        line
    }
}
