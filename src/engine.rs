//! Lint harness: per-document checks and multi-file aggregation

use crate::config::Config;
use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::document::TemplateDocument;
use crate::indent;
use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of a linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl LintResult {
    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
    }

    fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => self.info_count += 1,
        }
    }
}

/// The linter engine
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine with configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check a single already-loaded document.
    pub fn check_document(&self, doc: &TemplateDocument) -> Vec<Diagnostic> {
        debug!(
            "checking {} ({} tokens, {} roots)",
            doc.path().display(),
            doc.tokens().len(),
            doc.roots().len()
        );
        indent::check(doc, &self.config.indent)
    }

    /// Lint multiple document files in parallel.
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let results: Vec<LintResult> = files.par_iter().map(|f| self.lint_file(f)).collect();

        let mut combined = LintResult::default();
        for result in results {
            combined.merge(result);
        }
        combined.duration = start.elapsed();
        combined
    }

    /// Lint a single document file.
    pub fn lint_file(&self, path: &Path) -> LintResult {
        let mut result = LintResult {
            files_processed: 1,
            ..LintResult::default()
        };

        let doc = match TemplateDocument::load(path) {
            Ok(d) => d,
            Err(e) => {
                result.diagnostics.push(Diagnostic::new(
                    "document-read-error",
                    Severity::Error,
                    &format!("Failed to load document: {}", e),
                    Location::new(path.to_path_buf(), 0, 0),
                ));
                result.error_count = 1;
                result.files_with_errors = 1;
                return result;
            }
        };

        let diagnostics = self.check_document(&doc);
        let mut had_error = false;
        let mut had_warning = false;
        for diag in diagnostics {
            result.count(diag.severity);
            had_error |= diag.is_error();
            had_warning |= diag.is_warning();
            result.diagnostics.push(diag);
        }
        if had_error {
            result.files_with_errors = 1;
        }
        if had_warning {
            result.files_with_warnings = 1;
        }
        result
    }
}
