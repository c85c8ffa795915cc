//! The offset table: per-token symbolic indentation entries
//!
//! Each entry relates a token to a base token plus a number of indent
//! units. The table is keyed by the token arena index and lives only for
//! the duration of one lint pass.

use crate::token::TokenId;

/// One token's structural indentation relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    /// Token this entry is computed relative to; `None` for top-level roots.
    pub base: Option<TokenId>,
    /// Indent units added to the base's expected indent.
    pub offset: usize,
    /// When set, this token's expected indent is pinned to its literal
    /// source column instead of `base + offset`.
    pub baseline: bool,
}

/// Offset entries and the ignore set for one document pass.
#[derive(Debug)]
pub struct OffsetTable {
    entries: Vec<Option<OffsetEntry>>,
    ignored: Vec<bool>,
}

impl OffsetTable {
    pub fn new(token_count: usize) -> Self {
        Self {
            entries: vec![None; token_count],
            ignored: vec![false; token_count],
        }
    }

    pub fn get(&self, token: TokenId) -> Option<&OffsetEntry> {
        self.entries.get(token.index()).and_then(|e| e.as_ref())
    }

    /// Register (or overwrite) an offset entry. A self-referential base is
    /// silently skipped, as are tokens already in the ignore set.
    pub fn set_offset(&mut self, token: TokenId, offset: usize, base: TokenId) {
        if token == base || self.is_ignored(token) {
            return;
        }
        self.entries[token.index()] = Some(OffsetEntry {
            base: Some(base),
            offset,
            baseline: false,
        });
    }

    /// Register several tokens against the same base.
    pub fn set_offset_all<I>(&mut self, tokens: I, offset: usize, base: TokenId)
    where
        I: IntoIterator<Item = TokenId>,
    {
        for token in tokens {
            self.set_offset(token, offset, base);
        }
    }

    /// Pin a top-level token at a fixed number of indent units.
    pub fn set_root(&mut self, token: TokenId, units: usize) {
        if self.is_ignored(token) {
            return;
        }
        self.entries[token.index()] = Some(OffsetEntry {
            base: None,
            offset: units,
            baseline: false,
        });
    }

    /// Mark an existing entry as baseline. No effect if the token has no
    /// entry yet; callers must set the offset first.
    pub fn set_baseline(&mut self, token: TokenId) {
        if let Some(entry) = self.entries[token.index()].as_mut() {
            entry.baseline = true;
        }
    }

    /// Exclude a token from validation. Its entry, if any, is dropped and
    /// later `set_offset` calls on it become no-ops.
    pub fn ignore(&mut self, token: TokenId) {
        self.ignored[token.index()] = true;
        self.entries[token.index()] = None;
    }

    pub fn is_ignored(&self, token: TokenId) -> bool {
        self.ignored[token.index()]
    }
}
