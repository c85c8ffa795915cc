//! Test fixture parser
//!
//! Builds [`TemplateDocument`]s from literal source text so the
//! integration suites can exercise the engine end to end. Production input
//! comes from an external parser; this one covers the grammar subset the
//! tests use and simply panics on malformed fixtures.

#![allow(dead_code)]

use sleet::ast::{NodeId, NodeKind};
use sleet::config::IndentOptions;
use sleet::diagnostic::Diagnostic;
use sleet::document::{DocumentBuilder, TemplateDocument};
use sleet::token::{Span, TokenId, TokenKind};

/// Parse a template source (markup grammar with embedded expressions).
pub fn template(src: &str) -> TemplateDocument {
    template_at(std::path::Path::new("fixture.tpl"), src)
}

/// Parse a template source, recording a specific source path.
pub fn template_at(path: &std::path::Path, src: &str) -> TemplateDocument {
    let mut parser = Parser::new_at(path, src);
    parser.parse_template();
    parser.builder.build().expect("fixture template")
}

/// Parse a script source (statement grammar) as one embedded region.
pub fn program(src: &str) -> TemplateDocument {
    let mut parser = Parser::new(src);
    parser.parse_program_root();
    parser.builder.build().expect("fixture program")
}

/// Check a template fixture with the given options.
pub fn check_template(src: &str, options: &IndentOptions) -> Vec<Diagnostic> {
    sleet::indent::check(&template(src), options)
}

/// Check a script fixture with the given options.
pub fn check_program(src: &str, options: &IndentOptions) -> Vec<Diagnostic> {
    sleet::indent::check(&program(src), options)
}

const KEYWORDS: &[&str] = &[
    "break", "case", "const", "continue", "default", "delete", "do", "else", "false", "for",
    "function", "if", "in", "instanceof", "let", "new", "null", "of", "return", "switch", "this",
    "true", "typeof", "undefined", "var", "void", "while",
];

/// A token of an expression region, kept locally for the Pratt parser.
#[derive(Debug, Clone)]
struct ExprToken {
    id: TokenId,
    kind: TokenKind,
    span: Span,
    text: String,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    builder: DocumentBuilder,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self::new_at(std::path::Path::new("fixture.tpl"), src)
    }

    fn new_at(path: &std::path::Path, src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            builder: DocumentBuilder::new(path, src),
        }
    }

    // ----- low-level scanning -----

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn bump(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump(c.len_utf8());
            } else {
                break;
            }
        }
    }

    // ----- markup grammar -----

    fn parse_template(&mut self) {
        loop {
            self.skip_ws();
            if self.eof() {
                break;
            }
            if let Some(root) = self.parse_markup_node() {
                self.builder.add_root(root);
            }
        }
    }

    /// One markup construct; comments yield no node.
    fn parse_markup_node(&mut self) -> Option<NodeId> {
        if self.starts_with("<!--") {
            self.parse_markup_comment();
            None
        } else if self.starts_with("{{") {
            Some(self.parse_mustache())
        } else if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_markup_comment(&mut self) {
        let start = self.pos;
        let end_rel = self.rest().find("-->").expect("unterminated comment") + 3;
        self.bump(end_rel);
        self.builder
            .push_token(TokenKind::MarkupComment, start, self.pos);
    }

    fn parse_text(&mut self) -> NodeId {
        let start = self.pos;
        let mut end = self.src.len();
        let rest = self.rest();
        for (i, _) in rest.char_indices() {
            if rest[i..].starts_with('<') || rest[i..].starts_with("{{") {
                end = self.pos + i;
                break;
            }
        }
        // One Text token per non-blank line segment.
        let mut first_span: Option<Span> = None;
        let mut last_span: Option<Span> = None;
        let mut line_start = start;
        let text = &self.src[start..end];
        for line in text.split_inclusive('\n') {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let lead = line.len() - line.trim_start().len();
                let tok_start = line_start + lead;
                let tok_end = tok_start + trimmed.len();
                self.builder.push_token(TokenKind::Text, tok_start, tok_end);
                let span = Span::new(tok_start, tok_end);
                first_span.get_or_insert(span);
                last_span = Some(span);
            }
            line_start += line.len();
        }
        self.pos = end;
        let span = match (first_span, last_span) {
            (Some(f), Some(l)) => Span::new(f.start, l.end),
            _ => Span::new(start, end),
        };
        self.builder.push_node(NodeKind::Text, span)
    }

    fn parse_mustache(&mut self) -> NodeId {
        let start = self.pos;
        let open = self.builder.push_token(TokenKind::MustacheStart, start, start + 2);
        self.bump(2);
        let close_rel = self.rest().find("}}").expect("unterminated mustache");
        let inner_start = self.pos;
        let inner_end = self.pos + close_rel;
        let expr = self.parse_expression_region(inner_start, inner_end);
        self.pos = inner_end;
        let close = self
            .builder
            .push_token(TokenKind::MustacheEnd, self.pos, self.pos + 2);
        self.bump(2);
        self.builder.push_node(
            NodeKind::ExpressionContainer {
                open: Some(open),
                expr,
                close: Some(close),
            },
            Span::new(start, self.pos),
        )
    }

    fn scan_name(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '@'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let name = rest[..len].to_string();
        self.bump(len);
        name
    }

    fn parse_element(&mut self) -> NodeId {
        let start = self.pos;
        self.bump(1); // <
        let name = self.scan_name();
        self.builder.push_token(TokenKind::TagOpen, start, self.pos);

        let mut attributes = Vec::new();
        let mut self_closing = false;
        let start_tag_end;
        loop {
            self.skip_ws();
            if self.starts_with("/>") {
                self.builder
                    .push_token(TokenKind::SelfClosingTagClose, self.pos, self.pos + 2);
                self.bump(2);
                self_closing = true;
                start_tag_end = self.pos;
                break;
            }
            if self.starts_with(">") {
                self.builder
                    .push_token(TokenKind::TagClose, self.pos, self.pos + 1);
                self.bump(1);
                start_tag_end = self.pos;
                break;
            }
            attributes.push(self.parse_attribute());
        }
        let start_tag = self.builder.push_node(
            NodeKind::StartTag {
                attributes,
                self_closing,
            },
            Span::new(start, start_tag_end),
        );

        if self_closing {
            return self.builder.push_node(
                NodeKind::Element {
                    name,
                    start_tag,
                    children: Vec::new(),
                    end_tag: None,
                },
                Span::new(start, start_tag_end),
            );
        }

        // Children until the matching end tag (or EOF for recovery cases).
        let mut children = Vec::new();
        loop {
            self.skip_ws();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(child) = self.parse_markup_node() {
                children.push(child);
            }
        }

        let end_tag = if self.starts_with("</") {
            let end_start = self.pos;
            self.bump(2);
            self.scan_name();
            self.builder
                .push_token(TokenKind::EndTagOpen, end_start, self.pos);
            self.skip_ws();
            assert!(self.starts_with(">"), "malformed end tag");
            self.builder
                .push_token(TokenKind::TagClose, self.pos, self.pos + 1);
            self.bump(1);
            Some(
                self.builder
                    .push_node(NodeKind::EndTag, Span::new(end_start, self.pos)),
            )
        } else {
            None
        };

        self.builder.push_node(
            NodeKind::Element {
                name,
                start_tag,
                children,
                end_tag,
            },
            Span::new(start, self.pos),
        )
    }

    fn parse_attribute(&mut self) -> NodeId {
        let key_start = self.pos;
        let name = self.scan_name();
        assert!(!name.is_empty(), "malformed attribute at {}", key_start);
        let key = self
            .builder
            .push_token(TokenKind::AttributeName, key_start, self.pos);
        let directive = name.starts_with(':') || name.starts_with('@');

        if !self.starts_with("=") {
            return self.builder.push_node(
                NodeKind::Attribute {
                    key,
                    eq: None,
                    value: None,
                },
                Span::new(key_start, self.pos),
            );
        }
        let eq = self
            .builder
            .push_token(TokenKind::Equals, self.pos, self.pos + 1);
        self.bump(1);

        assert!(self.starts_with("\""), "expected quoted attribute value");
        let value_start = self.pos;
        let close_rel = self.rest()[1..]
            .find('"')
            .expect("unterminated attribute value");
        let inner_start = value_start + 1;
        let inner_end = inner_start + close_rel;
        let value_end = inner_end + 1;

        let value = if directive {
            let open = self
                .builder
                .push_token(TokenKind::Punctuator, value_start, inner_start);
            let expr = self.parse_expression_region(inner_start, inner_end);
            let close = self
                .builder
                .push_token(TokenKind::Punctuator, inner_end, value_end);
            self.builder.push_node(
                NodeKind::ExpressionContainer {
                    open: Some(open),
                    expr,
                    close: Some(close),
                },
                Span::new(value_start, value_end),
            )
        } else {
            self.builder
                .push_token(TokenKind::AttributeValue, value_start, value_end);
            self.builder
                .push_node(NodeKind::Literal, Span::new(value_start, value_end))
        };
        self.pos = value_end;

        self.builder.push_node(
            NodeKind::Attribute {
                key,
                eq: Some(eq),
                value: Some(value),
            },
            Span::new(key_start, value_end),
        )
    }

    // ----- expression grammar -----

    fn parse_program_root(&mut self) {
        let end = self.src.len();
        let tokens = self.tokenize_expr_region(0, end);
        if tokens.is_empty() {
            return;
        }
        let mut expr = ExprParser {
            builder: &mut self.builder,
            tokens,
            pos: 0,
        };
        let mut body = Vec::new();
        while !expr.eof() {
            body.push(expr.parse_statement());
        }
        let span = Span::new(
            expr.tokens.first().map(|t| t.span.start).unwrap_or(0),
            expr.tokens.last().map(|t| t.span.end).unwrap_or(end),
        );
        let program = self.builder.push_node(NodeKind::Program { body }, span);
        self.builder.add_root(program);
        self.pos = end;
    }

    /// Tokenize and parse one embedded expression; returns its node.
    fn parse_expression_region(&mut self, start: usize, end: usize) -> Option<NodeId> {
        let tokens = self.tokenize_expr_region(start, end);
        if tokens.is_empty() {
            return None;
        }
        let mut expr = ExprParser {
            builder: &mut self.builder,
            tokens,
            pos: 0,
        };
        let node = expr.parse_expression();
        Some(node)
    }

    /// Lex an expression region, pushing every token (comments included)
    /// into the document and returning the non-comment ones.
    fn tokenize_expr_region(&mut self, start: usize, end: usize) -> Vec<ExprToken> {
        let mut tokens = Vec::new();
        let mut pos = start;
        let src = self.src;

        while pos < end {
            let c = src[pos..end].chars().next().unwrap();
            if c.is_whitespace() {
                pos += c.len_utf8();
                continue;
            }

            let tok_start = pos;
            let kind;
            if src[pos..end].starts_with("//") {
                let len = src[pos..end].find('\n').unwrap_or(end - pos);
                pos += len;
                kind = TokenKind::LineComment;
            } else if src[pos..end].starts_with("/*") {
                let len = src[pos..end].find("*/").expect("unterminated comment") + 2;
                pos += len;
                kind = TokenKind::BlockComment;
            } else if c == '`' {
                // Template literal: emit chunk tokens and the tokens of the
                // embedded expressions in source order.
                self.lex_template(src, &mut pos, end, &mut tokens);
                continue;
            } else if c == '\'' || c == '"' {
                pos += 1;
                while pos < end {
                    let ch = src[pos..].chars().next().unwrap();
                    pos += ch.len_utf8();
                    if ch == '\\' {
                        pos += src[pos..].chars().next().map(|c| c.len_utf8()).unwrap_or(0);
                    } else if ch == c {
                        break;
                    }
                }
                kind = TokenKind::Str;
            } else if c.is_ascii_digit() {
                while pos < end {
                    let ch = src[pos..].chars().next().unwrap();
                    if ch.is_ascii_digit() || ch == '.' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                kind = TokenKind::Number;
            } else if c.is_alphabetic() || c == '_' || c == '$' {
                while pos < end {
                    let ch = src[pos..].chars().next().unwrap();
                    if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                        pos += ch.len_utf8();
                    } else {
                        break;
                    }
                }
                let text = &src[tok_start..pos];
                kind = if KEYWORDS.contains(&text) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
            } else {
                const MULTI: &[&str] = &[
                    "===", "!==", "...", "&&", "||", "??", "=>", "==", "!=", "<=", ">=", "++",
                    "--", "+=", "-=", "*=", "/=",
                ];
                let mut len = 1;
                for m in MULTI {
                    if src[pos..end].starts_with(m) {
                        len = m.len();
                        break;
                    }
                }
                pos += len;
                kind = TokenKind::Punctuator;
            }

            let id = self.builder.push_token(kind, tok_start, pos);
            if !kind.is_comment() {
                tokens.push(ExprToken {
                    id,
                    kind,
                    span: Span::new(tok_start, pos),
                    text: src[tok_start..pos].to_string(),
                });
            }
        }

        tokens
    }

    /// Lex one template literal starting at `*pos` (a backtick).
    fn lex_template(
        &mut self,
        src: &str,
        pos: &mut usize,
        end: usize,
        tokens: &mut Vec<ExprToken>,
    ) {
        let mut chunk_start = *pos;
        *pos += 1; // opening backtick
        loop {
            assert!(*pos < end, "unterminated template literal");
            let c = src[*pos..].chars().next().unwrap();
            if c == '`' {
                *pos += 1;
                let id = self
                    .builder
                    .push_token(TokenKind::Template, chunk_start, *pos);
                tokens.push(ExprToken {
                    id,
                    kind: TokenKind::Template,
                    span: Span::new(chunk_start, *pos),
                    text: src[chunk_start..*pos].to_string(),
                });
                return;
            }
            if src[*pos..end].starts_with("${") {
                *pos += 2;
                let id = self
                    .builder
                    .push_token(TokenKind::Template, chunk_start, *pos);
                tokens.push(ExprToken {
                    id,
                    kind: TokenKind::Template,
                    span: Span::new(chunk_start, *pos),
                    text: src[chunk_start..*pos].to_string(),
                });
                // Embedded expression runs to the matching brace.
                let expr_start = *pos;
                let mut depth = 1usize;
                while *pos < end && depth > 0 {
                    match src[*pos..].chars().next().unwrap() {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    if depth > 0 {
                        *pos += src[*pos..].chars().next().unwrap().len_utf8();
                    }
                }
                let inner = self.tokenize_expr_region(expr_start, *pos);
                tokens.extend(inner);
                chunk_start = *pos; // the closing `}` starts the next chunk
                *pos += 1;
                continue;
            }
            *pos += c.len_utf8();
        }
    }
}

// ----- Pratt parser over one expression region -----

struct ExprParser<'a> {
    builder: &'a mut DocumentBuilder,
    tokens: Vec<ExprToken>,
    pos: usize,
}

impl ExprParser<'_> {
    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn peek_text(&self) -> &str {
        self.peek().map(|t| t.text.as_str()).unwrap_or("")
    }

    fn peek_at(&self, n: usize) -> Option<&ExprToken> {
        self.tokens.get(self.pos + n)
    }

    fn advance(&mut self) -> ExprToken {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.peek_text() == text {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> ExprToken {
        assert_eq!(self.peek_text(), text, "fixture expected {:?}", text);
        self.advance()
    }

    fn node(&mut self, kind: NodeKind, start: usize, end: usize) -> NodeId {
        self.builder.push_node(kind, Span::new(start, end))
    }

    fn prev_end(&self) -> usize {
        self.tokens[self.pos - 1].span.end
    }

    // ----- statements -----

    fn parse_statement(&mut self) -> NodeId {
        let start = self.peek().expect("statement").span.start;
        match self.peek_text() {
            "{" => self.parse_block(),
            "if" => self.parse_if(start),
            "for" => self.parse_for(start),
            "while" => {
                self.advance();
                self.expect("(");
                let test = self.parse_expression();
                self.expect(")");
                let body = self.parse_statement();
                let end = self.prev_end();
                self.node(NodeKind::WhileStatement { test, body }, start, end)
            }
            "do" => {
                self.advance();
                let body = self.parse_statement();
                self.expect("while");
                self.expect("(");
                let test = self.parse_expression();
                self.expect(")");
                self.eat(";");
                let end = self.prev_end();
                self.node(NodeKind::DoWhileStatement { body, test }, start, end)
            }
            "switch" => self.parse_switch(start),
            "return" => {
                self.advance();
                let argument = if self.eof() || self.peek_text() == ";" || self.peek_text() == "}" {
                    None
                } else {
                    Some(self.parse_expression())
                };
                self.eat(";");
                let end = self.prev_end();
                self.node(NodeKind::ReturnStatement { argument }, start, end)
            }
            "break" => {
                self.advance();
                self.eat(";");
                self.node(NodeKind::BreakStatement, start, self.prev_end())
            }
            "continue" => {
                self.advance();
                self.eat(";");
                self.node(NodeKind::ContinueStatement, start, self.prev_end())
            }
            "let" | "const" | "var" => self.parse_var_declaration(true),
            _ => {
                let expression = self.parse_expression();
                self.eat(";");
                let end = self.prev_end();
                self.node(NodeKind::ExpressionStatement { expression }, start, end)
            }
        }
    }

    fn parse_block(&mut self) -> NodeId {
        let start = self.expect("{").span.start;
        let mut body = Vec::new();
        while !self.eof() && self.peek_text() != "}" {
            body.push(self.parse_statement());
        }
        let end = self.expect("}").span.end;
        self.node(NodeKind::BlockStatement { body }, start, end)
    }

    fn parse_if(&mut self, start: usize) -> NodeId {
        self.expect("if");
        self.expect("(");
        let test = self.parse_expression();
        self.expect(")");
        let consequent = self.parse_statement();
        let alternate = if self.eat("else") {
            Some(self.parse_statement())
        } else {
            None
        };
        let end = self.prev_end();
        self.node(
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            },
            start,
            end,
        )
    }

    fn parse_for(&mut self, start: usize) -> NodeId {
        self.expect("for");
        self.expect("(");

        // for-in / for-of: a single binding followed by `in` / `of`.
        let is_for_in = {
            let mut i = self.pos;
            let mut depth = 0usize;
            let mut found = false;
            while let Some(t) = self.tokens.get(i) {
                match t.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" if depth == 0 => break,
                    ")" | "]" | "}" => depth -= 1,
                    ";" if depth == 0 => break,
                    "in" | "of" if depth == 0 => {
                        found = true;
                        break;
                    }
                    _ => {}
                }
                i += 1;
            }
            found
        };

        if is_for_in {
            let left = if matches!(self.peek_text(), "let" | "const" | "var") {
                self.parse_var_declaration_no_init()
            } else {
                self.parse_expression()
            };
            let of = self.peek_text() == "of";
            self.advance(); // in / of
            let right = self.parse_expression();
            self.expect(")");
            let body = self.parse_statement();
            let end = self.prev_end();
            return self.node(
                NodeKind::ForInStatement {
                    left,
                    right,
                    of,
                    body,
                },
                start,
                end,
            );
        }

        let init = if self.peek_text() == ";" {
            None
        } else if matches!(self.peek_text(), "let" | "const" | "var") {
            Some(self.parse_var_declaration(false))
        } else {
            Some(self.parse_expression())
        };
        self.expect(";");
        let test = if self.peek_text() == ";" {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(";");
        let update = if self.peek_text() == ")" {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(")");
        let body = self.parse_statement();
        let end = self.prev_end();
        self.node(
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            },
            start,
            end,
        )
    }

    fn parse_switch(&mut self, start: usize) -> NodeId {
        self.expect("switch");
        self.expect("(");
        let discriminant = self.parse_expression();
        self.expect(")");
        self.expect("{");
        let mut cases = Vec::new();
        while !self.eof() && self.peek_text() != "}" {
            let case_start = self.peek().unwrap().span.start;
            let test = if self.eat("case") {
                let t = self.parse_expression();
                Some(t)
            } else {
                self.expect("default");
                None
            };
            self.expect(":");
            let mut body = Vec::new();
            while !self.eof() && !matches!(self.peek_text(), "case" | "default" | "}") {
                body.push(self.parse_statement());
            }
            let case_end = self.prev_end();
            cases.push(self.node(NodeKind::SwitchCase { test, body }, case_start, case_end));
        }
        let end = self.expect("}").span.end;
        self.node(
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            },
            start,
            end,
        )
    }

    fn parse_var_declaration(&mut self, consume_semi: bool) -> NodeId {
        let start = self.peek().expect("declaration").span.start;
        self.advance(); // let / const / var
        let mut declarations = Vec::new();
        loop {
            let d_start = self.peek().expect("declarator").span.start;
            let id_tok = self.advance();
            assert_eq!(id_tok.kind, TokenKind::Identifier, "fixture declarator");
            let id = self.node(NodeKind::Identifier, id_tok.span.start, id_tok.span.end);
            let init = if self.eat("=") {
                Some(self.parse_assignment())
            } else {
                None
            };
            let d_end = self.prev_end();
            declarations.push(self.node(NodeKind::VariableDeclarator { id, init }, d_start, d_end));
            if !self.eat(",") {
                break;
            }
        }
        let mut end = self.prev_end();
        if consume_semi && self.peek_text() == ";" {
            self.advance();
            end = self.prev_end();
        }
        self.node(NodeKind::VariableDeclaration { declarations }, start, end)
    }

    fn parse_var_declaration_no_init(&mut self) -> NodeId {
        let start = self.peek().expect("declaration").span.start;
        self.advance(); // let / const / var
        let d_start = self.peek().expect("declarator").span.start;
        let id_tok = self.advance();
        let id = self.node(NodeKind::Identifier, id_tok.span.start, id_tok.span.end);
        let declarator = self.node(
            NodeKind::VariableDeclarator { id, init: None },
            d_start,
            id_tok.span.end,
        );
        self.node(
            NodeKind::VariableDeclaration {
                declarations: vec![declarator],
            },
            start,
            id_tok.span.end,
        )
    }

    // ----- expressions -----

    fn parse_expression(&mut self) -> NodeId {
        self.parse_assignment()
    }

    fn parse_sequence(&mut self) -> NodeId {
        let start = self.peek().expect("expression").span.start;
        let first = self.parse_assignment();
        if self.peek_text() != "," {
            return first;
        }
        let mut expressions = vec![first];
        while self.eat(",") {
            expressions.push(self.parse_assignment());
        }
        let end = self.prev_end();
        self.node(NodeKind::SequenceExpression { expressions }, start, end)
    }

    fn parse_assignment(&mut self) -> NodeId {
        if let Some(arrow) = self.try_parse_arrow() {
            return arrow;
        }
        let start = self.peek().expect("expression").span.start;
        let left = self.parse_conditional();
        if matches!(self.peek_text(), "=" | "+=" | "-=" | "*=" | "/=") {
            self.advance();
            let right = self.parse_assignment();
            let end = self.prev_end();
            return self.node(NodeKind::AssignmentExpression { left, right }, start, end);
        }
        left
    }

    /// Lookahead for `ident =>` and `( params ) =>` arrow heads.
    fn try_parse_arrow(&mut self) -> Option<NodeId> {
        let first = self.peek()?;
        let start = first.span.start;
        if first.kind == TokenKind::Identifier
            && self.peek_at(1).map(|t| t.text.as_str()) == Some("=>")
        {
            let id_tok = self.advance();
            let param = self.node(NodeKind::Identifier, id_tok.span.start, id_tok.span.end);
            self.expect("=>");
            let body = self.parse_arrow_body();
            let end = self.prev_end();
            return Some(self.node(
                NodeKind::ArrowFunction {
                    params: vec![param],
                    body,
                },
                start,
                end,
            ));
        }
        if first.text == "(" {
            // Find the matching close paren and check for `=>` after it.
            let mut depth = 0usize;
            let mut i = self.pos;
            while let Some(t) = self.tokens.get(i) {
                match t.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            if self.tokens.get(i + 1).map(|t| t.text.as_str()) == Some("=>") {
                self.expect("(");
                let mut params = Vec::new();
                while self.peek_text() != ")" {
                    let id_tok = self.advance();
                    assert_eq!(id_tok.kind, TokenKind::Identifier, "fixture arrow param");
                    params.push(self.node(
                        NodeKind::Identifier,
                        id_tok.span.start,
                        id_tok.span.end,
                    ));
                    if !self.eat(",") {
                        break;
                    }
                }
                self.expect(")");
                self.expect("=>");
                let body = self.parse_arrow_body();
                let end = self.prev_end();
                return Some(self.node(NodeKind::ArrowFunction { params, body }, start, end));
            }
        }
        None
    }

    fn parse_arrow_body(&mut self) -> NodeId {
        if self.peek_text() == "{" {
            self.parse_block()
        } else {
            self.parse_assignment()
        }
    }

    fn parse_conditional(&mut self) -> NodeId {
        let start = self.peek().expect("expression").span.start;
        let test = self.parse_binary(0);
        if !self.eat("?") {
            return test;
        }
        let consequent = self.parse_assignment();
        self.expect(":");
        let alternate = self.parse_assignment();
        let end = self.prev_end();
        self.node(
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            },
            start,
            end,
        )
    }

    fn binary_precedence(op: &str) -> Option<(u8, bool)> {
        // (precedence, is_logical)
        match op {
            "||" | "??" => Some((1, true)),
            "&&" => Some((2, true)),
            "==" | "!=" | "===" | "!==" => Some((3, false)),
            "<" | ">" | "<=" | ">=" | "instanceof" | "in" => Some((4, false)),
            "+" | "-" => Some((5, false)),
            "*" | "/" | "%" => Some((6, false)),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_prec: u8) -> NodeId {
        let start = self.peek().expect("expression").span.start;
        let mut left = self.parse_unary();
        while let Some((prec, logical)) = Self::binary_precedence(self.peek_text()) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1);
            let end = self.prev_end();
            left = if logical {
                self.node(NodeKind::LogicalExpression { left, right }, start, end)
            } else {
                self.node(NodeKind::BinaryExpression { left, right }, start, end)
            };
        }
        left
    }

    fn parse_unary(&mut self) -> NodeId {
        let token = self.peek().expect("expression").clone();
        let start = token.span.start;
        match token.text.as_str() {
            "!" | "-" | "+" | "~" | "typeof" | "void" | "delete" => {
                self.advance();
                let argument = self.parse_unary();
                let end = self.prev_end();
                self.node(NodeKind::UnaryExpression { argument }, start, end)
            }
            "++" | "--" => {
                self.advance();
                let argument = self.parse_unary();
                let end = self.prev_end();
                self.node(
                    NodeKind::UpdateExpression {
                        argument,
                        prefix: true,
                    },
                    start,
                    end,
                )
            }
            _ => {
                let mut expr = self.parse_postfix();
                if matches!(self.peek_text(), "++" | "--") {
                    self.advance();
                    let end = self.prev_end();
                    expr = self.node(
                        NodeKind::UpdateExpression {
                            argument: expr,
                            prefix: false,
                        },
                        start,
                        end,
                    );
                }
                expr
            }
        }
    }

    fn parse_postfix(&mut self) -> NodeId {
        let start = self.peek().expect("expression").span.start;
        let mut expr = self.parse_primary();
        loop {
            match self.peek_text() {
                "." => {
                    self.advance();
                    let prop_tok = self.advance();
                    let property =
                        self.node(NodeKind::Identifier, prop_tok.span.start, prop_tok.span.end);
                    let end = self.prev_end();
                    expr = self.node(
                        NodeKind::MemberExpression {
                            object: expr,
                            property,
                            computed: false,
                        },
                        start,
                        end,
                    );
                }
                "[" => {
                    self.advance();
                    let property = self.parse_expression();
                    self.expect("]");
                    let end = self.prev_end();
                    expr = self.node(
                        NodeKind::MemberExpression {
                            object: expr,
                            property,
                            computed: true,
                        },
                        start,
                        end,
                    );
                }
                "(" => {
                    self.advance();
                    let arguments = self.parse_arguments();
                    self.expect(")");
                    let end = self.prev_end();
                    expr = self.node(
                        NodeKind::CallExpression {
                            callee: expr,
                            arguments,
                        },
                        start,
                        end,
                    );
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_arguments(&mut self) -> Vec<NodeId> {
        let mut arguments = Vec::new();
        while self.peek_text() != ")" {
            if self.peek_text() == "..." {
                let s = self.advance().span.start;
                let argument = self.parse_assignment();
                let end = self.prev_end();
                arguments.push(self.node(NodeKind::SpreadElement { argument }, s, end));
            } else {
                arguments.push(self.parse_assignment());
            }
            if !self.eat(",") {
                break;
            }
        }
        arguments
    }

    fn parse_primary(&mut self) -> NodeId {
        let token = self.peek().expect("expression").clone();
        let start = token.span.start;
        match token.kind {
            TokenKind::Number | TokenKind::Str => {
                self.advance();
                self.node(NodeKind::Literal, start, token.span.end)
            }
            TokenKind::Template => self.parse_template_literal(),
            TokenKind::Identifier => {
                self.advance();
                self.node(NodeKind::Identifier, start, token.span.end)
            }
            TokenKind::Keyword => match token.text.as_str() {
                "true" | "false" | "null" | "undefined" | "this" => {
                    self.advance();
                    self.node(NodeKind::Literal, start, token.span.end)
                }
                "new" => {
                    self.advance();
                    let callee = self.parse_postfix_no_call();
                    let arguments = if self.eat("(") {
                        let args = self.parse_arguments();
                        self.expect(")");
                        args
                    } else {
                        Vec::new()
                    };
                    let end = self.prev_end();
                    self.node(NodeKind::NewExpression { callee, arguments }, start, end)
                }
                "function" => {
                    self.advance();
                    self.expect("(");
                    let mut params = Vec::new();
                    while self.peek_text() != ")" {
                        let id_tok = self.advance();
                        params.push(self.node(
                            NodeKind::Identifier,
                            id_tok.span.start,
                            id_tok.span.end,
                        ));
                        if !self.eat(",") {
                            break;
                        }
                    }
                    self.expect(")");
                    let body = self.parse_block();
                    let end = self.prev_end();
                    self.node(NodeKind::FunctionExpression { params, body }, start, end)
                }
                other => panic!("fixture: unexpected keyword {:?}", other),
            },
            TokenKind::Punctuator => match token.text.as_str() {
                "(" => {
                    self.advance();
                    let expr = self.parse_sequence();
                    let end = self.expect(")").span.end;
                    self.node(NodeKind::Paren { expr }, start, end)
                }
                "[" => {
                    self.advance();
                    let mut elements = Vec::new();
                    loop {
                        if self.peek_text() == "]" {
                            break;
                        }
                        if self.peek_text() == "," {
                            self.advance();
                            elements.push(None); // hole
                            continue;
                        }
                        if self.peek_text() == "..." {
                            let s = self.advance().span.start;
                            let argument = self.parse_assignment();
                            let end = self.prev_end();
                            elements.push(Some(self.node(
                                NodeKind::SpreadElement { argument },
                                s,
                                end,
                            )));
                        } else {
                            elements.push(Some(self.parse_assignment()));
                        }
                        if !self.eat(",") {
                            break;
                        }
                    }
                    let end = self.expect("]").span.end;
                    self.node(NodeKind::ArrayExpression { elements }, start, end)
                }
                "{" => self.parse_object(),
                other => panic!("fixture: unexpected token {:?}", other),
            },
            _ => panic!("fixture: unexpected token {:?}", token.text),
        }
    }

    /// Callee of `new`: member chains but not call parens.
    fn parse_postfix_no_call(&mut self) -> NodeId {
        let start = self.peek().expect("expression").span.start;
        let mut expr = self.parse_primary();
        while self.peek_text() == "." {
            self.advance();
            let prop_tok = self.advance();
            let property = self.node(NodeKind::Identifier, prop_tok.span.start, prop_tok.span.end);
            let end = self.prev_end();
            expr = self.node(
                NodeKind::MemberExpression {
                    object: expr,
                    property,
                    computed: false,
                },
                start,
                end,
            );
        }
        expr
    }

    fn parse_object(&mut self) -> NodeId {
        let start = self.expect("{").span.start;
        let mut properties = Vec::new();
        while self.peek_text() != "}" {
            let p_start = self.peek().expect("property").span.start;
            if self.peek_text() == "..." {
                let s = self.advance().span.start;
                let argument = self.parse_assignment();
                let end = self.prev_end();
                properties.push(self.node(NodeKind::SpreadElement { argument }, s, end));
            } else {
                let key_tok = self.advance();
                let key = match key_tok.kind {
                    TokenKind::Identifier | TokenKind::Keyword => {
                        self.node(NodeKind::Identifier, key_tok.span.start, key_tok.span.end)
                    }
                    TokenKind::Str | TokenKind::Number => {
                        self.node(NodeKind::Literal, key_tok.span.start, key_tok.span.end)
                    }
                    _ => panic!("fixture: bad property key {:?}", key_tok.text),
                };
                let value = if self.eat(":") {
                    Some(self.parse_assignment())
                } else {
                    None // shorthand
                };
                let p_end = self.prev_end();
                properties.push(self.node(NodeKind::Property { key, value }, p_start, p_end));
            }
            if !self.eat(",") {
                break;
            }
        }
        let end = self.expect("}").span.end;
        self.node(NodeKind::ObjectExpression { properties }, start, end)
    }

    fn parse_template_literal(&mut self) -> NodeId {
        let first = self.advance();
        assert_eq!(first.kind, TokenKind::Template);
        let start = first.span.start;
        let mut end = first.span.end;
        let mut expressions = Vec::new();
        // Chunks ending in `${` are followed by an embedded expression and
        // another chunk.
        let mut open = first.text.ends_with("${");
        while open {
            expressions.push(self.parse_expression());
            let chunk = self.advance();
            assert_eq!(chunk.kind, TokenKind::Template, "fixture template chunk");
            end = chunk.span.end;
            open = chunk.text.ends_with("${");
        }
        self.node(NodeKind::TemplateLiteral { expressions }, start, end)
    }
}
