//! Offset table construction
//!
//! One pass over every top-level unit's subtree. Each node kind has a
//! handler that registers the offsets of the node's internal tokens and of
//! its children's first tokens; the token chains it produces terminate at
//! the unit's root token, which is pinned directly.
//!
//! Handlers must tolerate partial trees: a token a rule expects may be
//! missing after parser recovery, in which case the sub-rule is skipped.

use crate::ast::{NodeId, NodeKind};
use crate::config::IndentOptions;
use crate::document::TemplateDocument;
use crate::indent::offsets::OffsetTable;
use crate::token::{TokenId, TokenKind};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, trace, warn};

pub struct OffsetBuilder<'a> {
    pub(crate) doc: &'a TemplateDocument,
    pub(crate) options: &'a IndentOptions,
    pub(crate) table: OffsetTable,
    ignore_patterns: GlobSet,
}

impl<'a> OffsetBuilder<'a> {
    pub fn new(doc: &'a TemplateDocument, options: &'a IndentOptions) -> Self {
        let mut patterns = GlobSetBuilder::new();
        for pattern in &options.ignores {
            match Glob::new(pattern) {
                Ok(glob) => {
                    patterns.add(glob);
                }
                Err(e) => warn!("skipping invalid ignore pattern {:?}: {}", pattern, e),
            }
        }
        let ignore_patterns = patterns.build().unwrap_or_else(|e| {
            warn!("ignore patterns disabled: {}", e);
            GlobSet::empty()
        });

        Self {
            doc,
            options,
            table: OffsetTable::new(doc.tokens().len()),
            ignore_patterns,
        }
    }

    /// Walk every root and return the finished table.
    pub fn build(mut self) -> OffsetTable {
        for &root in self.doc.roots() {
            self.process_root(root);
        }
        self.table
    }

    fn process_root(&mut self, root: NodeId) {
        if let Some(first) = self.first_token(root) {
            self.table.set_root(first, self.options.base_indent);
        }
        self.walk(root);
    }

    fn walk(&mut self, id: NodeId) {
        let doc = self.doc;
        let kind = &doc.node(id).kind;
        if self.ignore_patterns.is_match(kind.name()) {
            debug!("ignoring {} at {:?} (pattern match)", kind.name(), doc.node(id).span);
            self.ignore_node(id);
            return;
        }
        self.handle(id);
        if kind.is_statement() {
            self.handle_trailing_semicolon(id);
        }
        for child in kind.child_ids() {
            self.walk(child);
        }
    }

    /// Route every token of a node (comments included) to the ignore set.
    pub(crate) fn ignore_node(&mut self, id: NodeId) {
        let span = self.doc.node(id).span;
        let ids: Vec<TokenId> = self.doc.tokens().in_span(span, true).collect();
        for token in ids {
            self.table.ignore(token);
        }
    }

    // ----- token helpers -----

    pub(crate) fn first_token(&self, id: NodeId) -> Option<TokenId> {
        self.doc.first_token_of(id)
    }

    pub(crate) fn last_token(&self, id: NodeId) -> Option<TokenId> {
        self.doc.last_token_of(id)
    }

    /// First non-comment token after the node.
    pub(crate) fn token_after_node(&self, id: NodeId) -> Option<TokenId> {
        self.doc.tokens().at_or_after(self.doc.node(id).span.end, false)
    }

    /// Whether a token is the first on its line (nothing before it, or the
    /// previous token — comments included — ends on an earlier line).
    pub(crate) fn begins_line(&self, token: TokenId) -> bool {
        let store = self.doc.tokens();
        match store.before(token, true) {
            None => true,
            Some(prev) => store.get(prev).end.line < store.get(token).start.line,
        }
    }

    /// Whether `token` is the head of the construct its node occupies in
    /// the enclosing structure (statement, container content, list
    /// element, ...). Continuation parents (operator chains) never count.
    fn begins_element(&self, token: TokenId, node: NodeId) -> bool {
        let doc = self.doc;
        let tok_start = doc.tokens().get(token).span.start;
        let n = doc.node(node);
        let Some(parent_id) = n.parent else {
            return false;
        };
        let parent = doc.node(parent_id);
        let starts_node = n.span.start == tok_start;
        match &parent.kind {
            k if k.is_statement() => parent.span.start == tok_start,
            NodeKind::Program { .. } => parent.span.start == tok_start,
            NodeKind::BinaryExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::AssignmentExpression { .. }
            | NodeKind::ConditionalExpression { .. }
            | NodeKind::MemberExpression { .. }
            | NodeKind::UnaryExpression { .. }
            | NodeKind::UpdateExpression { .. }
            | NodeKind::TemplateLiteral { .. } => false,
            _ => starts_node,
        }
    }

    /// The continuation offset of an operator construct: one unit when its
    /// head token opens a line or begins its enclosing element, flush
    /// otherwise.
    fn continuation_offset(&self, head: TokenId, node: NodeId) -> usize {
        if self.begins_line(head) || self.begins_element(head, node) {
            1
        } else {
            0
        }
    }

    fn token_is(&self, token: TokenId, text: &str) -> bool {
        self.doc.token_text(token) == text
    }

    // ----- dispatch -----

    fn handle(&mut self, id: NodeId) {
        let doc = self.doc;
        trace!("offsets for {} at {:?}", doc.node(id).kind.name(), doc.node(id).span);
        match &doc.node(id).kind {
            NodeKind::Element {
                name,
                start_tag,
                children,
                end_tag,
            } => self.handle_element(id, name, *start_tag, children, *end_tag),
            NodeKind::StartTag {
                attributes,
                self_closing,
            } => self.handle_start_tag(id, attributes, *self_closing),
            NodeKind::EndTag => self.handle_end_tag(id),
            NodeKind::Attribute { key, eq, value } => {
                self.handle_attribute(*key, *eq, *value);
            }
            NodeKind::ExpressionContainer { open, expr, close } => {
                self.handle_expression_container(*open, *expr, *close);
            }
            NodeKind::Text => self.handle_text(id),
            NodeKind::Identifier | NodeKind::Literal => {}
            NodeKind::TemplateLiteral { expressions } => {
                self.handle_template_literal(id, expressions);
            }
            NodeKind::Paren { expr } => self.handle_paren(id, *expr),
            NodeKind::ArrayExpression { elements } => {
                let elements = elements.clone();
                let left = self.first_token(id);
                let right = self.last_token(id);
                self.process_node_list(&elements, left, right, 1, true);
            }
            NodeKind::ObjectExpression { properties } => {
                let elements: Vec<_> = properties.iter().copied().map(Some).collect();
                let left = self.first_token(id);
                let right = self.last_token(id);
                self.process_node_list(&elements, left, right, 1, true);
            }
            NodeKind::Property { key, value } => self.handle_property(*key, *value),
            NodeKind::SpreadElement { argument } | NodeKind::UnaryExpression { argument } => {
                self.handle_prefix(id, *argument);
            }
            NodeKind::UpdateExpression { argument, prefix } => {
                if *prefix {
                    self.handle_prefix(id, *argument);
                } else if let (Some(op), Some(head)) =
                    (self.token_after_node(*argument), self.first_token(*argument))
                {
                    self.table.set_offset(op, 1, head);
                }
            }
            NodeKind::BinaryExpression { left, .. }
            | NodeKind::LogicalExpression { left, .. }
            | NodeKind::AssignmentExpression { left, .. } => {
                self.handle_operator_chain(id, *left);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => self.handle_conditional(id, *test, *consequent, *alternate),
            NodeKind::CallExpression { callee, arguments } => {
                self.handle_call(id, *callee, arguments.clone());
            }
            NodeKind::NewExpression { callee, arguments } => {
                self.handle_new(id, *callee, arguments.clone());
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => self.handle_member(id, *object, *property, *computed),
            NodeKind::SequenceExpression { expressions } => {
                let elements: Vec<_> = expressions.iter().copied().map(Some).collect();
                self.process_node_list(&elements, None, None, 0, true);
            }
            NodeKind::ArrowFunction { params, body } => {
                self.handle_arrow(id, params.clone(), *body);
            }
            NodeKind::FunctionExpression { params, body } => {
                self.handle_function(id, params.clone(), *body);
            }
            NodeKind::Program { body } => {
                let elements: Vec<_> = body.iter().copied().map(Some).collect();
                self.process_node_list(&elements, None, None, 0, true);
            }
            NodeKind::ExpressionStatement { .. } => {}
            NodeKind::BlockStatement { body } => {
                let elements: Vec<_> = body.iter().copied().map(Some).collect();
                let left = self.first_token(id);
                let right = self.last_token(id);
                self.process_node_list(&elements, left, right, 1, true);
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => self.handle_if(id, *test, *consequent, *alternate),
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => self.handle_for(id, *init, *test, *update, *body),
            NodeKind::ForInStatement {
                left, right, body, ..
            } => self.handle_for_in(id, *left, *right, *body),
            NodeKind::WhileStatement { test, body } => self.handle_while(id, *test, *body),
            NodeKind::DoWhileStatement { body, test } => self.handle_do_while(id, *body, *test),
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => self.handle_switch(id, *discriminant, cases.clone()),
            NodeKind::SwitchCase { test, body } => self.handle_switch_case(id, *test, body.clone()),
            NodeKind::ReturnStatement { argument } => {
                if let (Some(arg), Some(first)) = (*argument, self.first_token(id)) {
                    if let Some(arg_first) = self.first_token(arg) {
                        self.table.set_offset(arg_first, 1, first);
                    }
                }
            }
            NodeKind::BreakStatement | NodeKind::ContinueStatement => {}
            NodeKind::VariableDeclaration { declarations } => {
                let elements: Vec<_> = declarations.iter().copied().map(Some).collect();
                let left = self.first_token(id);
                self.process_node_list(&elements, left, None, 1, true);
            }
            NodeKind::VariableDeclarator { id: pat, init } => {
                self.handle_declarator(*pat, *init);
            }
            NodeKind::Unknown => {
                debug!("unknown construct at {:?}", doc.node(id).span);
                self.ignore_node(id);
            }
        }
    }

    // ----- markup handlers -----

    fn handle_element(
        &mut self,
        id: NodeId,
        name: &str,
        start_tag: NodeId,
        children: &[NodeId],
        end_tag: Option<NodeId>,
    ) {
        let Some(open) = self.first_token(start_tag) else {
            return;
        };

        let self_closing = matches!(
            self.doc.node(start_tag).kind,
            NodeKind::StartTag { self_closing: true, .. }
        );
        if end_tag.is_none() && !self_closing {
            // Premature EOF recovery: do not touch the interior.
            let span = self.doc.node(id).span;
            let inner_start = self.doc.node(start_tag).span.end;
            let ids: Vec<TokenId> = self
                .doc
                .tokens()
                .in_span(crate::token::Span::new(inner_start, span.end), true)
                .collect();
            for token in ids {
                self.table.ignore(token);
            }
            return;
        }

        if self.options.is_preformatted(name) {
            if let Some(end) = end_tag {
                let inner_start = self.doc.node(start_tag).span.end;
                let inner_end = self.doc.node(end).span.start;
                let ids: Vec<TokenId> = self
                    .doc
                    .tokens()
                    .in_span(crate::token::Span::new(inner_start, inner_end), true)
                    .collect();
                for token in ids {
                    self.table.ignore(token);
                }
            }
        } else {
            let child_heads: Vec<TokenId> = children
                .iter()
                .filter_map(|&c| self.first_token(c))
                .collect();
            self.table.set_offset_all(child_heads, 1, open);
        }

        if let Some(end) = end_tag {
            if let Some(end_open) = self.first_token(end) {
                self.table.set_offset(end_open, 0, open);
            }
        }
    }

    fn handle_start_tag(&mut self, id: NodeId, attributes: &[NodeId], self_closing: bool) {
        let Some(open) = self.first_token(id) else {
            return;
        };
        let elements: Vec<_> = attributes.iter().copied().map(Some).collect();
        self.process_node_list(
            &elements,
            Some(open),
            None,
            self.options.attribute,
            self.options.align_attributes_vertically,
        );
        if let Some(close) = self.last_token(id) {
            let kind = self.doc.tokens().get(close).kind;
            let offset = if self_closing && kind == TokenKind::SelfClosingTagClose {
                self.options.close_bracket.self_closing_tag()
            } else if kind == TokenKind::TagClose {
                self.options.close_bracket.start_tag()
            } else {
                return;
            };
            self.table.set_offset(close, offset, open);
        }
    }

    fn handle_end_tag(&mut self, id: NodeId) {
        // The close bracket hangs off the *start* tag's opening token so a
        // reconfigured end-tag bracket cannot drag the whole element over.
        let doc = self.doc;
        let Some(parent_id) = doc.node(id).parent else {
            return;
        };
        let NodeKind::Element { start_tag, .. } = &doc.node(parent_id).kind else {
            return;
        };
        let Some(start_open) = self.first_token(*start_tag) else {
            return;
        };
        if let Some(close) = self.last_token(id) {
            if doc.tokens().get(close).kind == TokenKind::TagClose {
                self.table
                    .set_offset(close, self.options.close_bracket.end_tag(), start_open);
            }
        }
    }

    fn handle_attribute(&mut self, key: TokenId, eq: Option<TokenId>, value: Option<NodeId>) {
        if let Some(eq) = eq {
            self.table.set_offset(eq, 1, key);
        }
        if let Some(value) = value {
            if let Some(value_first) = self
                .doc
                .tokens()
                .first_in(self.doc.node(value).span, true)
            {
                self.table.set_offset(value_first, 1, key);
            }
        }
    }

    fn handle_expression_container(
        &mut self,
        open: Option<TokenId>,
        expr: Option<NodeId>,
        close: Option<TokenId>,
    ) {
        let Some(open) = open else {
            return;
        };
        if let Some(expr) = expr {
            if let Some(expr_first) = self.first_token(expr) {
                self.table.set_offset(expr_first, 1, open);
            }
        }
        if let Some(close) = close {
            self.table.set_offset(close, 0, open);
        }
    }

    fn handle_text(&mut self, id: NodeId) {
        let span = self.doc.node(id).span;
        let ids: Vec<TokenId> = self.doc.tokens().in_span(span, false).collect();
        if let Some((&first, rest)) = ids.split_first() {
            self.table.set_offset_all(rest.iter().copied(), 0, first);
        }
    }

    // ----- expression handlers -----

    fn handle_template_literal(&mut self, id: NodeId, expressions: &[NodeId]) {
        let Some(first) = self.first_token(id) else {
            return;
        };
        let span = self.doc.node(id).span;
        let chunks: Vec<TokenId> = self
            .doc
            .tokens()
            .in_span(span, false)
            .filter(|&t| t != first && self.doc.tokens().get(t).kind == TokenKind::Template)
            .collect();
        self.table.set_offset_all(chunks, 0, first);
        let heads: Vec<TokenId> = expressions
            .iter()
            .filter_map(|&e| self.first_token(e))
            .collect();
        self.table.set_offset_all(heads, 1, first);
    }

    fn handle_paren(&mut self, id: NodeId, expr: NodeId) {
        let Some(open) = self.first_token(id) else {
            return;
        };
        if let Some(inner) = self.first_token(expr) {
            self.table.set_offset(inner, 1, open);
        }
        if let Some(close) = self.last_token(id) {
            self.table.set_offset(close, 0, open);
        }
    }

    fn handle_property(&mut self, key: NodeId, value: Option<NodeId>) {
        let Some(value) = value else {
            return; // shorthand
        };
        let Some(key_first) = self.first_token(key) else {
            return;
        };
        if let Some(colon) = self.token_after_node(key) {
            if self.token_is(colon, ":") {
                self.table.set_offset(colon, 1, key_first);
            }
        }
        if let Some(value_first) = self.first_token(value) {
            self.table.set_offset(value_first, 1, key_first);
        }
    }

    fn handle_prefix(&mut self, id: NodeId, argument: NodeId) {
        if let (Some(first), Some(arg_first)) = (self.first_token(id), self.first_token(argument)) {
            self.table.set_offset(arg_first, 1, first);
        }
    }

    fn handle_operator_chain(&mut self, id: NodeId, left: NodeId) {
        let Some(head) = self.first_token(id) else {
            return;
        };
        let Some(op) = self.token_after_node(left) else {
            return;
        };
        let offset = self.continuation_offset(head, id);
        let mut targets = vec![op];
        if let Some(right_first) = self.doc.tokens().after(op, false) {
            targets.push(right_first);
        }
        self.table.set_offset_all(targets, offset, head);
    }

    fn handle_conditional(
        &mut self,
        id: NodeId,
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    ) {
        let Some(head) = self.first_token(id) else {
            return;
        };
        let offset = self.continuation_offset(head, id);
        let mut targets = Vec::new();
        if let Some(question) = self.token_after_node(test) {
            targets.push(question);
        }
        if let Some(t) = self.first_token(consequent) {
            targets.push(t);
        }
        if let Some(colon) = self.token_after_node(consequent) {
            targets.push(colon);
        }
        if let Some(t) = self.first_token(alternate) {
            targets.push(t);
        }
        self.table.set_offset_all(targets, offset, head);
    }

    fn handle_call(&mut self, id: NodeId, callee: NodeId, arguments: Vec<NodeId>) {
        let Some(head) = self.first_token(id) else {
            return;
        };
        let Some(open) = self.token_after_node(callee) else {
            return;
        };
        if !self.token_is(open, "(") {
            return;
        }
        let close = self.last_token(id);
        self.table.set_offset(open, 1, head);
        let elements: Vec<_> = arguments.into_iter().map(Some).collect();
        self.process_node_list(&elements, Some(open), close, 1, true);
    }

    fn handle_new(&mut self, id: NodeId, callee: NodeId, arguments: Vec<NodeId>) {
        let Some(new_token) = self.first_token(id) else {
            return;
        };
        if let Some(callee_first) = self.first_token(callee) {
            self.table.set_offset(callee_first, 1, new_token);
        }
        let Some(open) = self.token_after_node(callee) else {
            return;
        };
        if !self.token_is(open, "(") {
            return; // `new Foo` without an argument list
        }
        let close = self.last_token(id);
        self.table.set_offset(open, 1, new_token);
        let elements: Vec<_> = arguments.into_iter().map(Some).collect();
        self.process_node_list(&elements, Some(open), close, 1, true);
    }

    fn handle_member(&mut self, id: NodeId, object: NodeId, property: NodeId, computed: bool) {
        let Some(head) = self.first_token(id) else {
            return;
        };
        if computed {
            let Some(bracket) = self.token_after_node(object) else {
                return;
            };
            self.table.set_offset(bracket, 1, head);
            if let Some(prop_first) = self.first_token(property) {
                self.table.set_offset(prop_first, 1, bracket);
            }
            if let Some(close) = self.last_token(id) {
                self.table.set_offset(close, 0, bracket);
            }
        } else {
            let mut targets = Vec::new();
            if let Some(dot) = self.token_after_node(object) {
                targets.push(dot);
            }
            if let Some(prop_first) = self.first_token(property) {
                targets.push(prop_first);
            }
            self.table.set_offset_all(targets, 1, head);
        }
    }

    fn handle_arrow(&mut self, id: NodeId, params: Vec<NodeId>, body: NodeId) {
        let Some(first) = self.first_token(id) else {
            return;
        };
        let Some(body_first) = self.first_token(body) else {
            return;
        };
        let arrow = self
            .doc
            .tokens()
            .before(body_first, false)
            .filter(|&t| self.token_is(t, "=>"));

        if self.token_is(first, "(") {
            if let Some(arrow) = arrow {
                if let Some(close_paren) = self.doc.tokens().before(arrow, false) {
                    let elements: Vec<_> = params.into_iter().map(Some).collect();
                    self.process_node_list(&elements, Some(first), Some(close_paren), 1, true);
                }
            }
        }
        if let Some(arrow) = arrow {
            self.table.set_offset(arrow, 1, first);
        }
        let body_offset = if self.is_block(body) { 0 } else { 1 };
        self.table.set_offset(body_first, body_offset, first);
    }

    fn handle_function(&mut self, id: NodeId, params: Vec<NodeId>, body: NodeId) {
        let Some(first) = self.first_token(id) else {
            return;
        };
        let Some(body_first) = self.first_token(body) else {
            return;
        };
        let Some(close_paren) = self.doc.tokens().before(body_first, false) else {
            return;
        };
        let open_paren = match params.first().and_then(|&p| self.first_token(p)) {
            Some(param_first) => self.doc.tokens().before(param_first, false),
            None => self.doc.tokens().before(close_paren, false),
        };
        if let Some(open) = open_paren.filter(|&t| self.token_is(t, "(")) {
            self.table.set_offset(open, 1, first);
            let elements: Vec<_> = params.into_iter().map(Some).collect();
            self.process_node_list(&elements, Some(open), Some(close_paren), 1, true);
        }
        self.table.set_offset(body_first, 0, first);
    }

    // ----- statement handlers -----

    fn is_block(&self, id: NodeId) -> bool {
        matches!(self.doc.node(id).kind, NodeKind::BlockStatement { .. })
    }

    /// Body of a control-flow construct: flush for blocks (the brace
    /// carries the indent), one unit otherwise.
    fn set_maybe_block(&mut self, body: NodeId, base: TokenId) {
        if let Some(body_first) = self.first_token(body) {
            let offset = if self.is_block(body) { 0 } else { 1 };
            self.table.set_offset(body_first, offset, base);
        }
    }

    fn handle_trailing_semicolon(&mut self, id: NodeId) {
        let (Some(first), Some(last)) = (self.first_token(id), self.last_token(id)) else {
            return;
        };
        if first != last && self.token_is(last, ";") {
            self.table.set_offset(last, 0, first);
        }
    }

    fn handle_if(
        &mut self,
        id: NodeId,
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    ) {
        let Some(if_token) = self.first_token(id) else {
            return;
        };
        if let Some(open) = self.doc.tokens().after(if_token, false) {
            if self.token_is(open, "(") {
                self.table.set_offset(open, 1, if_token);
                if let Some(test_first) = self.first_token(test) {
                    self.table.set_offset(test_first, 1, open);
                }
                if let Some(close) = self.token_after_node(test) {
                    self.table.set_offset(close, 0, open);
                }
            }
        }
        self.set_maybe_block(consequent, if_token);

        if let Some(alternate) = alternate {
            let Some(else_token) = self.token_after_node(consequent) else {
                return;
            };
            self.table.set_offset(else_token, 0, if_token);
            if let Some(alt_first) = self.first_token(alternate) {
                // `else if` chains and blocks stay flush with `else`.
                let offset = if self.is_block(alternate)
                    || matches!(
                        self.doc.node(alternate).kind,
                        NodeKind::IfStatement { .. }
                    ) {
                    0
                } else {
                    1
                };
                self.table.set_offset(alt_first, offset, else_token);
            }
        }
    }

    fn handle_for(
        &mut self,
        id: NodeId,
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    ) {
        let Some(for_token) = self.first_token(id) else {
            return;
        };
        let Some(open) = self.doc.tokens().after(for_token, false) else {
            return;
        };
        if self.token_is(open, "(") {
            self.table.set_offset(open, 1, for_token);
            let close = self
                .first_token(body)
                .and_then(|body_first| self.doc.tokens().before(body_first, false));
            self.process_node_list(&[init, test, update], Some(open), close, 1, true);
        }
        self.set_maybe_block(body, for_token);
    }

    fn handle_for_in(&mut self, id: NodeId, left: NodeId, right: NodeId, body: NodeId) {
        let Some(for_token) = self.first_token(id) else {
            return;
        };
        let Some(open) = self.doc.tokens().after(for_token, false) else {
            return;
        };
        if self.token_is(open, "(") {
            self.table.set_offset(open, 1, for_token);
            if let Some(left_first) = self.first_token(left) {
                self.table.set_offset(left_first, 1, open);
                let mut targets = Vec::new();
                if let Some(key) = self.token_after_node(left) {
                    targets.push(key);
                }
                if let Some(right_first) = self.first_token(right) {
                    targets.push(right_first);
                }
                self.table.set_offset_all(targets, 1, left_first);
            }
            if let Some(close) = self.token_after_node(right) {
                self.table.set_offset(close, 0, open);
            }
        }
        self.set_maybe_block(body, for_token);
    }

    fn handle_while(&mut self, id: NodeId, test: NodeId, body: NodeId) {
        let Some(while_token) = self.first_token(id) else {
            return;
        };
        if let Some(open) = self.doc.tokens().after(while_token, false) {
            if self.token_is(open, "(") {
                self.table.set_offset(open, 1, while_token);
                if let Some(test_first) = self.first_token(test) {
                    self.table.set_offset(test_first, 1, open);
                }
                if let Some(close) = self.token_after_node(test) {
                    self.table.set_offset(close, 0, open);
                }
            }
        }
        self.set_maybe_block(body, while_token);
    }

    fn handle_do_while(&mut self, id: NodeId, body: NodeId, test: NodeId) {
        let Some(do_token) = self.first_token(id) else {
            return;
        };
        self.set_maybe_block(body, do_token);
        let Some(while_token) = self.token_after_node(body) else {
            return;
        };
        self.table.set_offset(while_token, 0, do_token);
        if let Some(open) = self.doc.tokens().after(while_token, false) {
            if self.token_is(open, "(") {
                self.table.set_offset(open, 1, while_token);
                if let Some(test_first) = self.first_token(test) {
                    self.table.set_offset(test_first, 1, open);
                }
                if let Some(close) = self.token_after_node(test) {
                    self.table.set_offset(close, 0, open);
                }
            }
        }
    }

    fn handle_switch(&mut self, id: NodeId, discriminant: NodeId, cases: Vec<NodeId>) {
        let Some(switch_token) = self.first_token(id) else {
            return;
        };
        let Some(open) = self.doc.tokens().after(switch_token, false) else {
            return;
        };
        if !self.token_is(open, "(") {
            return;
        }
        self.table.set_offset(open, 1, switch_token);
        if let Some(disc_first) = self.first_token(discriminant) {
            self.table.set_offset(disc_first, 1, open);
        }
        let Some(close_paren) = self.token_after_node(discriminant) else {
            return;
        };
        self.table.set_offset(close_paren, 0, open);
        let Some(left_brace) = self.doc.tokens().after(close_paren, false) else {
            return;
        };
        self.table.set_offset(left_brace, 0, switch_token);
        let right_brace = self.last_token(id);
        let elements: Vec<_> = cases.into_iter().map(Some).collect();
        self.process_node_list(
            &elements,
            Some(left_brace),
            right_brace,
            self.options.switch_case,
            true,
        );
    }

    fn handle_switch_case(&mut self, id: NodeId, test: Option<NodeId>, body: Vec<NodeId>) {
        let Some(case_token) = self.first_token(id) else {
            return;
        };
        let colon = match test {
            Some(test) => {
                if let Some(test_first) = self.first_token(test) {
                    self.table.set_offset(test_first, 1, case_token);
                }
                self.token_after_node(test)
            }
            None => self.doc.tokens().after(case_token, false),
        };
        if let Some(colon) = colon.filter(|&t| self.token_is(t, ":")) {
            self.table.set_offset(colon, 1, case_token);
        }

        if body.len() == 1 && self.is_block(body[0]) {
            if let Some(block_first) = self.first_token(body[0]) {
                self.table.set_offset(block_first, 0, case_token);
            }
        } else {
            let heads: Vec<TokenId> = body.iter().filter_map(|&s| self.first_token(s)).collect();
            self.table.set_offset_all(heads, 1, case_token);
        }
    }

    fn handle_declarator(&mut self, pat: NodeId, init: Option<NodeId>) {
        let Some(init) = init else {
            return;
        };
        let Some(id_first) = self.first_token(pat) else {
            return;
        };
        if let Some(eq) = self.token_after_node(pat) {
            if self.token_is(eq, "=") {
                self.table.set_offset(eq, 1, id_first);
            }
        }
        if let Some(init_first) = self.first_token(init) {
            self.table.set_offset(init_first, 1, id_first);
        }
    }
}
