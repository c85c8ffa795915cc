//! Fix application
//!
//! Diagnostics carry byte-range replacements against the document source.
//! Ranges from one pass never overlap, so fixes apply back-to-front without
//! offset bookkeeping; overlapping ranges (possible when results of several
//! passes are mixed) are skipped and counted.

use crate::diagnostic::Diagnostic;
use crate::document::TemplateDocument;
use log::debug;
use std::path::{Path, PathBuf};

/// Result of one fix application.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    /// The rewritten source text
    pub content: String,
    /// Fixes applied
    pub applied: usize,
    /// Fixes skipped (overlapping or out of bounds)
    pub skipped: usize,
}

/// Summary over several files.
#[derive(Debug, Default)]
pub struct FixOutcome {
    /// Number of files modified
    pub files_modified: usize,
    /// Number of fixes applied
    pub fixes_applied: usize,
    /// Number of fixes skipped
    pub fixes_skipped: usize,
    /// Errors encountered
    pub errors: Vec<String>,
}

/// Applies whitespace-replacement fixes to source text.
pub struct Fixer {
    /// Dry run mode (don't write changes)
    dry_run: bool,
}

impl Fixer {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply every fix carried by `diagnostics` to `source`.
    pub fn apply_to_source(&self, source: &str, diagnostics: &[Diagnostic]) -> FixedSource {
        let mut fixes: Vec<_> = diagnostics.iter().filter_map(|d| d.fix.as_ref()).collect();
        fixes.sort_by(|a, b| b.start.cmp(&a.start));

        let mut content = source.to_string();
        let mut applied = 0;
        let mut skipped = 0;
        let mut last_start = usize::MAX;

        for fix in fixes {
            if fix.end > content.len() || fix.start > fix.end || fix.end > last_start {
                skipped += 1;
                continue;
            }
            content.replace_range(fix.start..fix.end, &fix.replacement);
            last_start = fix.start;
            applied += 1;
        }

        FixedSource {
            content,
            applied,
            skipped,
        }
    }

    /// Fix one document and write the result to its source path.
    pub fn fix_document(
        &self,
        doc: &TemplateDocument,
        diagnostics: &[Diagnostic],
        outcome: &mut FixOutcome,
    ) {
        let fixed = self.apply_to_source(doc.source(), diagnostics);
        outcome.fixes_applied += fixed.applied;
        outcome.fixes_skipped += fixed.skipped;
        if fixed.applied == 0 {
            return;
        }
        if self.dry_run {
            debug!(
                "dry run: would write {} ({} fixes)",
                doc.path().display(),
                fixed.applied
            );
            outcome.files_modified += 1;
            return;
        }
        match self.write(doc.path(), &fixed.content) {
            Ok(()) => outcome.files_modified += 1,
            Err(e) => outcome
                .errors
                .push(format!("{}: {}", doc.path().display(), e)),
        }
    }

    fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        std::fs::write(path, content)
    }
}

/// Pair a fixed document path with its rewritten content, for callers that
/// want the diff rather than the write.
pub fn preview(doc: &TemplateDocument, diagnostics: &[Diagnostic]) -> (PathBuf, FixedSource) {
    let fixer = Fixer::new(true);
    (
        doc.path().to_path_buf(),
        fixer.apply_to_source(doc.source(), diagnostics),
    )
}
