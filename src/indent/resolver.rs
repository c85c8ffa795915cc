//! Expected-indent resolution
//!
//! Second phase of the pass: the token stream is walked in source order,
//! grouped into runs that share a line. Each run's expected indent is found
//! by following offset chains up to a token whose indent is already known —
//! a pinned root, or a token fixed by an earlier line. Results are memoized
//! per line so later chains terminate in one hop.
//!
//! Comment-only lines defer to the next code line; a run that starts beside
//! the end of a multiline token is not checked at all.

use crate::config::IndentOptions;
use crate::document::TemplateDocument;
use crate::indent::offsets::OffsetTable;
use crate::token::TokenId;
use log::trace;

/// One line's validation request, produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCheck {
    /// First token of the line (or a deferred comment token).
    pub token: TokenId,
    /// Expected indent, in indent characters.
    pub expected: usize,
    /// Further acceptable indents (comment attachment candidates).
    pub alternatives: Vec<usize>,
    /// Whether this check came from a deferred comment line.
    pub is_comment: bool,
}

pub struct LineResolver<'a> {
    doc: &'a TemplateDocument,
    options: &'a IndentOptions,
    table: &'a OffsetTable,
    /// Memoized expected indents, keyed by token arena index.
    memo: Vec<Option<usize>>,
}

impl<'a> LineResolver<'a> {
    pub fn new(
        doc: &'a TemplateDocument,
        options: &'a IndentOptions,
        table: &'a OffsetTable,
    ) -> Self {
        Self {
            doc,
            options,
            table,
            memo: vec![None; doc.tokens().len()],
        }
    }

    /// Resolve every line of the document into validation requests.
    pub fn resolve(mut self) -> Vec<LineCheck> {
        let store = self.doc.tokens();
        let mut checks = Vec::new();

        let mut run: Vec<TokenId> = Vec::new();
        let mut pending_comments: Vec<TokenId> = Vec::new();
        let mut beside_multiline = false;
        let mut last_validated: Option<TokenId> = None;

        for (id, token) in store.iter() {
            let same_line = run
                .first()
                .map(|&first| store.get(first).start.line == token.start.line)
                .unwrap_or(true);
            if run.is_empty() || same_line {
                run.push(id);
                continue;
            }

            let run_last_end = store.get(*run.last().unwrap()).end.line;
            if run.iter().all(|&t| store.get(t).kind.is_comment()) {
                // Comment-only line: attach it to the next code line.
                pending_comments.push(run[0]);
            } else {
                if !beside_multiline {
                    last_validated =
                        self.process_run(&run, &pending_comments, last_validated, &mut checks);
                }
                pending_comments.clear();
            }
            beside_multiline = run_last_end == token.start.line;
            run.clear();
            run.push(id);
        }

        if !run.is_empty()
            && !beside_multiline
            && !run.iter().all(|&t| store.get(t).kind.is_comment())
        {
            self.process_run(&run, &pending_comments, last_validated, &mut checks);
        }

        checks
    }

    /// Resolve one line run; returns the new "last validated" token.
    fn process_run(
        &mut self,
        run: &[TokenId],
        comments: &[TokenId],
        last_validated: Option<TokenId>,
        checks: &mut Vec<LineCheck>,
    ) -> Option<TokenId> {
        let store = self.doc.tokens();
        let first = run[0];
        let actual_indent = store.get(first).start.column;

        // Collect candidates across the run's tokens; scanning stops once a
        // chain lands on a baseline token.
        let mut expected_first: Option<usize> = None;
        let mut expected_base: Option<usize> = None;
        for (i, &token) in run.iter().enumerate() {
            if let Some((value, via_baseline)) = self.chain_expected(token, i == 0) {
                if expected_first.is_none() {
                    expected_first = Some(value);
                }
                expected_base = Some(expected_base.map_or(value, |b: usize| b.min(value)));
                if via_baseline {
                    break;
                }
            }
        }

        let (Some(expected), Some(base)) = (expected_first, expected_base) else {
            trace!(
                "line {} unresolved, skipping",
                store.get(first).start.line
            );
            return last_validated;
        };

        // Fix the expected indent of every token on this line so later
        // chains can stop here. Baseline tokens pin to their source column,
        // shifted by whatever correction this line itself needs.
        for &token in run {
            let Some(entry) = self.table.get(token) else {
                continue;
            };
            let value = if entry.baseline {
                match self.options.indent {
                    crate::config::IndentUnit::Spaces(_) => {
                        let column = store.get(token).start.column;
                        (column + base).saturating_sub(actual_indent)
                    }
                    crate::config::IndentUnit::Tab => base,
                }
            } else {
                base
            };
            self.memo[token.index()] = Some(value);
        }

        // Deferred comment lines accept the previous code line's indent or
        // this line's, whichever the author chose.
        let mut candidates: Vec<usize> = Vec::new();
        if let Some(prev) = last_validated {
            if let Some(prev_expected) = self.memo[prev.index()] {
                candidates.push(prev_expected);
            }
        }
        if !candidates.contains(&expected) {
            candidates.push(expected);
        }

        for &comment in comments {
            if self.table.is_ignored(comment) {
                continue;
            }
            let own = self.chain_expected(comment, true).map(|(v, _)| v);
            let comment_expected = own.unwrap_or(candidates[0]);
            let alternatives: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&c| c != comment_expected)
                .collect();
            checks.push(LineCheck {
                token: comment,
                expected: comment_expected,
                alternatives,
                is_comment: true,
            });
        }

        if !self.table.is_ignored(first) {
            checks.push(LineCheck {
                token: first,
                expected,
                alternatives: Vec::new(),
                is_comment: false,
            });
        }

        Some(first)
    }

    /// Follow a token's offset chain until a token with a known expected
    /// indent. Returns the accumulated indent (in characters) and whether
    /// the chain terminated at a baseline token.
    ///
    /// A memoized baseline terminator only resolves the first token of a
    /// run; for any other token the chain is unusable (the run then tries
    /// its next token).
    fn chain_expected(&self, token: TokenId, is_first: bool) -> Option<(usize, bool)> {
        if self.table.is_ignored(token) {
            return None;
        }
        if let Some(own) = self.memo[token.index()] {
            return Some((own, false));
        }

        let unit = self.options.indent.size();
        let mut acc = 0usize;
        let mut current = token;
        // An offset chain is acyclic by construction; the hop bound is a
        // guard against a broken table.
        for _ in 0..=self.doc.tokens().len() {
            let entry = self.table.get(current)?;
            acc += entry.offset * unit;
            let Some(base) = entry.base else {
                return Some((acc, false));
            };
            if self.table.is_ignored(base) {
                return None;
            }
            if let Some(base_expected) = self.memo[base.index()] {
                let base_is_baseline = self
                    .table
                    .get(base)
                    .map(|e| e.baseline)
                    .unwrap_or(false);
                if base_is_baseline && !is_first {
                    return None;
                }
                return Some((acc + base_expected, base_is_baseline));
            }
            current = base;
        }
        debug_assert!(false, "offset chain did not terminate");
        None
    }
}
