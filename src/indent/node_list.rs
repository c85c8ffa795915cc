//! Delimited sibling-list layout
//!
//! One algorithm covers array elements, call arguments, object properties,
//! attribute lists, block bodies, and `for` headers. The first present
//! sibling becomes the alignment anchor; everything after it either aligns
//! under the anchor (anchored layout) or takes a flat offset from the left
//! delimiter. Holes (`None`) are skipped without breaking the chain.

use crate::ast::NodeId;
use crate::indent::builder::OffsetBuilder;
use crate::token::TokenId;

impl OffsetBuilder<'_> {
    /// Lay out a delimited list of siblings.
    ///
    /// * `left`/`right` — enclosing delimiter tokens, when present. The
    ///   right delimiter is always flush with the left one.
    /// * `offset` — units between the left delimiter and the anchor (or,
    ///   in flat layout, every sibling).
    /// * `align_vertically` — anchored layout when true, flat when false.
    pub(crate) fn process_node_list(
        &mut self,
        elements: &[Option<NodeId>],
        left: Option<TokenId>,
        right: Option<TokenId>,
        offset: usize,
        align_vertically: bool,
    ) {
        let store = self.doc.tokens();
        let mut anchor: Option<TokenId> = None;
        let mut last: Option<TokenId> = left;
        // Separators (commas, header semicolons, comments) before the
        // anchor hang off the left delimiter; everything later aligns with
        // the rest of the list.
        let mut before_anchor: Vec<TokenId> = Vec::new();
        let mut aligned: Vec<TokenId> = Vec::new();

        for element in elements.iter().copied() {
            let Some(element) = element else {
                continue;
            };
            let Some(first) = self.doc.first_token_of(element) else {
                continue;
            };
            let Some(last_of_element) = self.doc.last_token_of(element) else {
                continue;
            };
            if let Some(prev) = last {
                let separators = store.between(prev, first, true);
                if anchor.is_none() {
                    before_anchor.extend(separators);
                } else {
                    aligned.extend(separators);
                }
            }
            if anchor.is_none() {
                anchor = Some(first);
            } else {
                aligned.push(first);
            }
            last = Some(last_of_element);
        }

        if let (Some(prev), Some(right)) = (last, right) {
            aligned.extend(store.between(prev, right, true));
        }

        if let Some(anchor) = anchor {
            if let Some(left) = left {
                self.table.set_offset_all(before_anchor, offset, left);
                self.table.set_offset(anchor, offset, left);
            }
            if align_vertically || left.is_none() {
                self.table.set_offset_all(aligned, 0, anchor);
            } else if let Some(left) = left {
                self.table.set_offset_all(aligned, offset, left);
            }

            if align_vertically {
                let any_on_own_line = elements
                    .iter()
                    .flatten()
                    .filter_map(|&e| self.doc.first_token_of(e))
                    .any(|t| self.begins_line(t));
                if any_on_own_line {
                    self.table.set_baseline(anchor);
                }
            }
        }

        if let (Some(left), Some(right)) = (left, right) {
            self.table.set_offset(right, 0, left);
        }
    }
}
