//! Recursive-descent tree builder: statements and declarations.
//!
//! Expressions, patterns and types live in `expr.rs`. Both halves share the
//! [`Parser`] state defined here.

use super::kind::NodeKind;
use super::tree::{uncovered, Node, NodeId, ParseError, SyntaxTree};
use crate::lexer::{lex, Lexed};
use crate::span::Span;
use crate::token::{is_declaration_keyword, is_modifier, Token, TokenKind};
use tracing::debug;

/// Nesting limit for statements, expressions, patterns and types.
pub(super) const MAX_DEPTH: usize = 128;

const ACCESSOR_NAMES: &[&str] = &[
    "get", "set", "willSet", "didSet", "_read", "_modify", "init", "unsafeAddress",
    "unsafeMutableAddress",
];

const DIRECTIVES: &[&str] = &[
    "#if",
    "#elseif",
    "#else",
    "#endif",
    "#warning",
    "#error",
    "#sourceLocation",
];

/// Keywords that begin a statement; closure signature detection stops at them.
pub(super) const STATEMENT_KEYWORDS: &[&str] = &[
    "let", "var", "if", "guard", "for", "while", "repeat", "return", "switch", "do", "defer",
    "throw", "break", "continue", "fallthrough", "case", "func", "struct", "class", "enum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    TypeBody,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    Eof,
    RBrace,
    CaseEnd,
}

pub(super) fn parse(source: &str) -> SyntaxTree {
    let Lexed {
        tokens,
        errors: lex_errors,
    } = lex(source);

    let mut parser = Parser::new(&tokens, source.len());
    let items = parser.block_items(Until::Eof);
    let Parser {
        mut nodes, errors, ..
    } = parser;

    let root = NodeId(nodes.len());
    for child in &items {
        nodes[child.0].parent = Some(root);
    }
    nodes.push(Node {
        kind: NodeKind::SourceFile,
        span: Span::new(0, source.len()),
        children: items,
        parent: None,
        tokens: 0..tokens.len(),
    });

    // Children are finished before their parents, so the first node to
    // claim a token is the deepest one covering it.
    let mut owners = vec![root; tokens.len()];
    let mut claimed = vec![false; tokens.len()];
    for (index, node) in nodes.iter().enumerate() {
        for i in uncovered(&nodes, node).into_iter().flatten() {
            if !claimed[i] {
                claimed[i] = true;
                owners[i] = NodeId(index);
            }
        }
    }

    debug!(
        tokens = tokens.len(),
        nodes = nodes.len(),
        errors = errors.len(),
        "parsed buffer"
    );

    SyntaxTree {
        tokens,
        nodes,
        owners,
        root,
        errors,
        lex_errors,
    }
}

pub(super) struct Parser<'t> {
    tokens: &'t [Token],
    /// Indices of code (non-trivia) tokens.
    code: Vec<usize>,
    /// Cursor into `code`.
    pub(super) pos: usize,
    pub(super) nodes: Vec<Node>,
    pub(super) errors: Vec<ParseError>,
    pub(super) depth: usize,
    scopes: Vec<Scope>,
    source_len: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], source_len: usize) -> Self {
        let code = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            code,
            pos: 0,
            nodes: Vec::new(),
            errors: Vec::new(),
            depth: 0,
            scopes: Vec::new(),
            source_len,
        }
    }

    // ---- cursor ----------------------------------------------------------

    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.code.len()
    }

    pub(super) fn nth(&self, n: usize) -> Option<&'t Token> {
        self.code.get(self.pos + n).map(|&i| &self.tokens[i])
    }

    pub(super) fn peek(&self) -> Option<&'t Token> {
        self.nth(0)
    }

    pub(super) fn code_token(&self, ci: usize) -> Option<&'t Token> {
        self.code.get(ci).map(|&i| &self.tokens[i])
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    pub(super) fn nth_is(&self, n: usize, kind: TokenKind) -> bool {
        self.nth(n).is_some_and(|t| t.kind == kind)
    }

    pub(super) fn at_keyword(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(kw))
    }

    pub(super) fn at_operator(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_operator(op))
    }

    pub(super) fn at_ident(&self, name: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(name))
    }

    pub(super) fn bump(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    pub(super) fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_here(format!("expected {what}"));
            false
        }
    }

    /// True when trivia separates code token `ci` from the previous one.
    pub(super) fn trivia_before_at(&self, ci: usize) -> bool {
        match (ci.checked_sub(1), self.code.get(ci)) {
            (Some(prev), Some(&cur)) => cur > self.code[prev] + 1,
            (None, Some(&cur)) => cur > 0,
            _ => true,
        }
    }

    pub(super) fn trivia_before(&self) -> bool {
        self.trivia_before_at(self.pos)
    }

    /// True when trivia (or end of input) follows code token `ci`.
    pub(super) fn trivia_after_at(&self, ci: usize) -> bool {
        match (self.code.get(ci), self.code.get(ci + 1)) {
            (Some(&cur), Some(&next)) => next > cur + 1,
            _ => true,
        }
    }

    /// True when a line break separates code token `ci` from the previous one.
    pub(super) fn newline_before_at(&self, ci: usize) -> bool {
        let Some(&cur) = self.code.get(ci) else {
            return true;
        };
        let from = ci.checked_sub(1).map_or(0, |p| self.code[p] + 1);
        self.tokens[from..cur].iter().any(|t| match t.kind {
            TokenKind::Newline => true,
            TokenKind::BlockComment => t.text.contains('\n'),
            _ => false,
        }) || ci == 0
    }

    pub(super) fn newline_before(&self) -> bool {
        self.newline_before_at(self.pos)
    }

    // ---- nodes and errors ------------------------------------------------

    pub(super) fn finish(&mut self, kind: NodeKind, start: usize, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let (tokens, span) = if self.pos > start {
            let first = self.code[start];
            let last = self.code[self.pos - 1];
            (
                first..last + 1,
                Span::new(self.tokens[first].span.start, self.tokens[last].span.end),
            )
        } else {
            let at = self.code.get(start).copied().unwrap_or(self.tokens.len());
            let offset = self.tokens.get(at).map_or(self.source_len, |t| t.span.start);
            (at..at, Span::empty(offset))
        };
        // an empty child sits at the next code token, which may lie past
        // the last token this node consumed
        let span = children
            .iter()
            .fold(span, |acc, child| acc.cover(self.nodes[child.0].span));
        for child in &children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            children,
            parent: None,
            tokens,
        });
        id
    }

    pub(super) fn error_here(&mut self, message: impl Into<String>) {
        let span = self
            .peek()
            .map_or(Span::empty(self.source_len), |t| t.span);
        self.errors.push(ParseError {
            span,
            message: message.into(),
        });
    }

    /// Skips to the next synchronization point and wraps the skipped tokens
    /// in an `Error` node. Always consumes at least one token.
    pub(super) fn recover(&mut self, message: &str) -> NodeId {
        let start = self.pos;
        self.error_here(message);
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            if self.pos > start && depth == 0 {
                let boundary = tok.kind.is_close_delimiter()
                    || matches!(tok.kind, TokenKind::StringMiddle | TokenKind::StringTail)
                    || self.newline_before()
                    || (tok.kind == TokenKind::Keyword && is_declaration_keyword(&tok.text));
                if boundary {
                    break;
                }
            }
            match tok.kind {
                k if k.is_open_delimiter() => depth += 1,
                TokenKind::StringHead => depth += 1,
                k if k.is_close_delimiter() => depth = depth.saturating_sub(1),
                TokenKind::StringTail => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        self.finish(NodeKind::Error, start, Vec::new())
    }

    /// Consumes a bracketed group starting at the current open delimiter.
    pub(super) fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            if tok.kind.is_open_delimiter() {
                depth += 1;
            } else if tok.kind.is_close_delimiter() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.bump();
                    return;
                }
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// Runs `f` one nesting level deeper, or returns `None` past the limit.
    pub(super) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        Some(out)
    }

    fn in_type_body(&self) -> bool {
        self.scopes.last() == Some(&Scope::TypeBody)
    }

    // ---- blocks and statements -------------------------------------------

    fn at_block_end(&self, until: Until) -> bool {
        match until {
            Until::Eof => false,
            Until::RBrace => self.at(TokenKind::RBrace),
            Until::CaseEnd => {
                self.at(TokenKind::RBrace)
                    || self.at_keyword("case")
                    || self.at_keyword("default")
                    || self.peek().is_some_and(|t| {
                        t.kind == TokenKind::Attribute && t.text == "@unknown"
                    })
            }
        }
    }

    fn block_items(&mut self, until: Until) -> Vec<NodeId> {
        let mut items = Vec::new();
        loop {
            while self.eat(TokenKind::Semicolon) {}
            if self.at_end() || self.at_block_end(until) {
                break;
            }
            let before = self.pos;
            items.push(self.statement());
            if self.pos == before {
                self.bump();
                items.push(self.finish(NodeKind::Error, before, Vec::new()));
            }
        }
        items
    }

    pub(super) fn code_block(&mut self) -> NodeId {
        self.braced_block(Scope::Code)
    }

    fn braced_block(&mut self, scope: Scope) -> NodeId {
        let start = self.pos;
        self.expect(TokenKind::LBrace, "'{'");
        self.scopes.push(scope);
        let items = self.block_items(Until::RBrace);
        self.scopes.pop();
        self.expect(TokenKind::RBrace, "'}'");
        self.finish(NodeKind::CodeBlock, start, items)
    }

    fn required_block(&mut self, children: &mut Vec<NodeId>) {
        if self.at(TokenKind::LBrace) {
            children.push(self.code_block());
        } else {
            self.error_here("expected '{'");
        }
    }

    /// Statements inside a closure body, up to but excluding the closing brace.
    pub(super) fn closure_items(&mut self) -> Vec<NodeId> {
        self.scopes.push(Scope::Code);
        let items = self.block_items(Until::RBrace);
        self.scopes.pop();
        items
    }

    fn statement(&mut self) -> NodeId {
        match self.nested(Self::statement_inner) {
            Some(node) => node,
            None => self.recover("statement nested too deeply"),
        }
    }

    fn statement_inner(&mut self) -> NodeId {
        let start = self.pos;
        let Some(tok) = self.peek() else {
            return self.recover("expected statement");
        };

        match tok.kind {
            TokenKind::Attribute => return self.declaration(),
            TokenKind::PoundKeyword if DIRECTIVES.contains(&tok.text.as_str()) => {
                return self.compiler_directive();
            }
            TokenKind::Keyword => match tok.text.as_str() {
                "if" => return self.if_stmt(start),
                "guard" => return self.guard_stmt(),
                "while" => return self.while_stmt(start),
                "repeat" => return self.repeat_while_stmt(start),
                "for" => return self.for_in_stmt(start),
                "switch" => return self.switch_stmt(start),
                "do" => return self.do_stmt(start),
                "defer" => return self.defer_stmt(),
                "return" => return self.return_stmt(),
                "throw" => return self.throw_stmt(),
                "break" | "continue" | "fallthrough" => return self.control_transfer(),
                "case" if !self.in_type_body() => return self.case_condition(),
                _ => {}
            },
            TokenKind::Identifier
                if self.nth_is(1, TokenKind::Colon)
                    && self.nth(2).is_some_and(|t| {
                        ["for", "while", "repeat", "switch", "do", "if"]
                            .iter()
                            .any(|kw| t.is_keyword(kw))
                    }) =>
            {
                self.bump_n(2);
                return self.labeled(start);
            }
            _ => {}
        }

        if self.at_declaration_start() {
            return self.declaration();
        }
        if let Some(expr) = self.expr(super::expr::Restrictions::NONE) {
            return self.finish(NodeKind::ExpressionStmt, start, vec![expr]);
        }
        self.recover("expected statement")
    }

    fn labeled(&mut self, start: usize) -> NodeId {
        match self.peek().map(|t| t.text.as_str()) {
            Some("for") => self.for_in_stmt(start),
            Some("while") => self.while_stmt(start),
            Some("repeat") => self.repeat_while_stmt(start),
            Some("switch") => self.switch_stmt(start),
            Some("do") => self.do_stmt(start),
            _ => self.if_stmt(start),
        }
    }

    pub(super) fn if_stmt(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut children = Vec::new();
        children.extend(self.condition_list());
        self.required_block(&mut children);
        if self.eat_keyword("else") {
            if self.at_keyword("if") {
                let nested = self.pos;
                if let Some(node) = self.nested(|p| p.if_stmt(nested)) {
                    children.push(node);
                } else {
                    children.push(self.recover("statement nested too deeply"));
                }
            } else {
                self.required_block(&mut children);
            }
        }
        self.finish(NodeKind::IfStmt, start, children)
    }

    fn guard_stmt(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        children.extend(self.condition_list());
        if !self.eat_keyword("else") {
            self.error_here("expected 'else' after guard condition");
        }
        self.required_block(&mut children);
        self.finish(NodeKind::GuardStmt, start, children)
    }

    fn while_stmt(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut children = Vec::new();
        children.extend(self.condition_list());
        self.required_block(&mut children);
        self.finish(NodeKind::WhileStmt, start, children)
    }

    fn repeat_while_stmt(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut children = Vec::new();
        self.required_block(&mut children);
        if self.eat_keyword("while") {
            match self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE) {
                Some(cond) => children.push(cond),
                None => self.error_here("expected loop condition"),
            }
        } else {
            self.error_here("expected 'while' after repeat body");
        }
        self.finish(NodeKind::RepeatWhileStmt, start, children)
    }

    fn for_in_stmt(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut children = Vec::new();
        self.eat_keyword("case");
        while self.eat_keyword("try") || self.eat_keyword("await") {}
        match self.pattern() {
            Some(pattern) => children.push(pattern),
            None => self.error_here("expected loop pattern"),
        }
        if self.eat_keyword("in") {
            match self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE) {
                Some(seq) => children.push(seq),
                None => self.error_here("expected sequence expression"),
            }
        } else {
            self.error_here("expected 'in'");
        }
        if self.eat_keyword("where") {
            children.extend(self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE));
        }
        self.required_block(&mut children);
        self.finish(NodeKind::ForInStmt, start, children)
    }

    pub(super) fn switch_stmt(&mut self, start: usize) -> NodeId {
        self.bump();
        let mut children = Vec::new();
        match self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE) {
            Some(subject) => children.push(subject),
            None => self.error_here("expected switch subject"),
        }
        if !self.expect(TokenKind::LBrace, "'{'") {
            return self.finish(NodeKind::SwitchStmt, start, children);
        }
        loop {
            let Some(tok) = self.peek() else { break };
            if tok.kind == TokenKind::RBrace {
                break;
            }
            if tok.is_keyword("case")
                || tok.is_keyword("default")
                || (tok.kind == TokenKind::Attribute && tok.text == "@unknown")
            {
                children.push(self.switch_case());
            } else if tok.kind == TokenKind::PoundKeyword && DIRECTIVES.contains(&tok.text.as_str())
            {
                children.push(self.compiler_directive());
            } else {
                children.push(self.recover("expected 'case' or 'default'"));
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.finish(NodeKind::SwitchStmt, start, children)
    }

    fn switch_case(&mut self) -> NodeId {
        let start = self.pos;
        let mut children = Vec::new();
        if self.at(TokenKind::Attribute) {
            children.push(self.attribute());
        }
        if !self.eat_keyword("default") && self.eat_keyword("case") {
            loop {
                let pattern_start = self.pos;
                let mut parts = Vec::new();
                parts.extend(self.pattern());
                if self.eat_keyword("where") {
                    parts.extend(self.expr(super::expr::Restrictions::NONE));
                }
                if self.pos > pattern_start {
                    children.push(self.finish(NodeKind::CasePattern, pattern_start, parts));
                } else {
                    self.error_here("expected case pattern");
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Colon, "':' after case label");
        self.scopes.push(Scope::Code);
        children.extend(self.block_items(Until::CaseEnd));
        self.scopes.pop();
        self.finish(NodeKind::SwitchCase, start, children)
    }

    fn do_stmt(&mut self, start: usize) -> NodeId {
        self.bump();
        if self.eat_keyword("throws") && self.at(TokenKind::LParen) {
            self.skip_balanced();
        }
        let mut children = Vec::new();
        self.required_block(&mut children);
        while self.at_keyword("catch") {
            children.push(self.catch_clause());
        }
        self.finish(NodeKind::DoStmt, start, children)
    }

    fn catch_clause(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        if !self.at(TokenKind::LBrace) {
            loop {
                children.extend(self.pattern());
                if self.eat_keyword("where") {
                    children.extend(self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE));
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.required_block(&mut children);
        self.finish(NodeKind::CatchClause, start, children)
    }

    fn defer_stmt(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        self.required_block(&mut children);
        self.finish(NodeKind::DeferStmt, start, children)
    }

    fn return_stmt(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        if !self.newline_before() && self.can_start_expr() {
            children.extend(self.expr(super::expr::Restrictions::NONE));
        }
        self.finish(NodeKind::ReturnStmt, start, children)
    }

    fn throw_stmt(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        match self.expr(super::expr::Restrictions::NONE) {
            Some(value) => children.push(value),
            None => self.error_here("expected error value"),
        }
        self.finish(NodeKind::ThrowStmt, start, children)
    }

    fn control_transfer(&mut self) -> NodeId {
        let start = self.pos;
        let takes_label = !self.at_keyword("fallthrough");
        self.bump();
        if takes_label && self.at(TokenKind::Identifier) && !self.newline_before() {
            self.bump();
        }
        self.finish(NodeKind::ControlTransferStmt, start, Vec::new())
    }

    fn compiler_directive(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        while !self.at_end() && !self.newline_before() {
            self.bump();
        }
        self.finish(NodeKind::CompilerDirective, start, Vec::new())
    }

    // ---- conditions ------------------------------------------------------

    fn condition_list(&mut self) -> Option<NodeId> {
        let start = self.pos;
        let mut children = Vec::new();
        loop {
            let condition = if self.at_keyword("let") || self.at_keyword("var") {
                Some(self.optional_binding())
            } else if self.at_keyword("case") {
                Some(self.case_condition())
            } else {
                self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE)
            };
            match condition {
                Some(node) => children.push(node),
                None => {
                    self.error_here("expected condition");
                    break;
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if children.is_empty() {
            None
        } else {
            Some(self.finish(NodeKind::ConditionList, start, children))
        }
    }

    fn optional_binding(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        if self.at(TokenKind::LParen) {
            children.extend(self.pattern());
        } else if self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword))
        {
            self.bump();
        } else {
            self.error_here("expected binding name");
        }
        if self.eat(TokenKind::Colon) {
            children.extend(self.ty());
        }
        if self.at_operator("=") {
            self.bump();
            match self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE) {
                Some(value) => children.push(value),
                None => self.error_here("expected value"),
            }
        }
        self.finish(NodeKind::OptionalBinding, start, children)
    }

    /// `case pattern = value`, used both inside condition lists and as a
    /// statement of its own.
    fn case_condition(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        let pattern_start = self.pos;
        if let Some(pattern) = self.pattern() {
            children.push(self.finish(NodeKind::CasePattern, pattern_start, vec![pattern]));
        } else {
            self.error_here("expected pattern");
        }
        if self.at_operator("=") {
            self.bump();
            match self.expr(super::expr::Restrictions::NO_TRAILING_CLOSURE) {
                Some(value) => children.push(value),
                None => self.error_here("expected value"),
            }
        } else {
            self.error_here("expected '=' after case pattern");
        }
        self.finish(NodeKind::CaseCondition, start, children)
    }

    // ---- declarations ----------------------------------------------------

    /// Code index of the declaration keyword after a run of modifiers
    /// starting at `at`, if that run exists.
    fn modifier_run_end(&self, at: usize) -> Option<usize> {
        let is_word = |t: &Token| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword);
        let mut i = at;
        loop {
            let Some(tok) = self.code_token(i) else {
                return None;
            };
            let next = self.code_token(i + 1);
            let next_continues = next.is_some_and(|n| {
                is_word(n) && (is_modifier(&n.text) || is_declaration_keyword(&n.text))
            });
            let modifier = is_word(tok)
                && match tok.text.as_str() {
                    "class" => next_continues,
                    "async" => next.is_some_and(|n| n.is_keyword("let") || n.is_keyword("var")),
                    text => is_modifier(text),
                };
            if !modifier {
                break;
            }
            i += 1;
            let setter = self.code_token(i).is_some_and(|t| t.kind == TokenKind::LParen)
                && !self.trivia_before_at(i)
                && self
                    .code_token(i + 1)
                    .is_some_and(|t| t.kind == TokenKind::Identifier)
                && self
                    .code_token(i + 2)
                    .is_some_and(|t| t.kind == TokenKind::RParen);
            if setter {
                i += 3;
            }
        }
        if i == at {
            return None;
        }
        self.code_token(i)
            .filter(|t| t.kind == TokenKind::Keyword && is_declaration_keyword(&t.text))
            .map(|_| i)
    }

    fn at_declaration_start(&self) -> bool {
        let Some(tok) = self.peek() else {
            return false;
        };
        match tok.kind {
            TokenKind::Attribute => true,
            TokenKind::Keyword if tok.text == "case" => self.in_type_body(),
            TokenKind::Keyword if is_declaration_keyword(&tok.text) => true,
            TokenKind::Keyword | TokenKind::Identifier => self.modifier_run_end(self.pos).is_some(),
            _ => false,
        }
    }

    pub(super) fn attribute(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        if self.at(TokenKind::LParen) && !self.trivia_before() {
            self.skip_balanced();
        }
        self.finish(NodeKind::Attribute, start, Vec::new())
    }

    fn declaration(&mut self) -> NodeId {
        let start = self.pos;
        let mut children = Vec::new();
        while self.at(TokenKind::Attribute) {
            children.push(self.attribute());
        }
        if let Some(end) = self.modifier_run_end(self.pos) {
            let list_start = self.pos;
            while self.pos < end {
                self.bump();
            }
            children.push(self.finish(NodeKind::ModifierList, list_start, Vec::new()));
        }

        let keyword = self
            .peek()
            .filter(|t| t.kind == TokenKind::Keyword)
            .map(|t| t.text.as_str());
        match keyword {
            Some("import") => self.import_decl(start, children),
            Some("struct" | "class" | "enum" | "protocol" | "extension" | "actor") => {
                self.type_decl(start, children)
            }
            Some("func" | "init" | "deinit" | "subscript") => self.function_decl(start, children),
            Some("let" | "var") => self.variable_decl(start, children),
            Some("case") => self.enum_case_decl(start, children),
            Some("typealias" | "associatedtype") => self.type_alias_decl(start, children),
            Some("operator" | "precedencegroup") => self.operator_decl(start, children),
            _ if children.is_empty() => self.recover("expected declaration"),
            _ => {
                self.error_here("expected declaration after attributes");
                self.finish(NodeKind::Error, start, children)
            }
        }
    }

    fn import_decl(&mut self, start: usize, children: Vec<NodeId>) -> NodeId {
        self.bump();
        while let Some(tok) = self.peek() {
            let path_part = matches!(
                tok.kind,
                TokenKind::Identifier | TokenKind::Keyword | TokenKind::Dot
            );
            if !path_part || self.newline_before() {
                break;
            }
            self.bump();
        }
        self.finish(NodeKind::ImportDecl, start, children)
    }

    fn type_decl(&mut self, start: usize, mut children: Vec<NodeId>) -> NodeId {
        let extension = self.at_keyword("extension");
        self.bump();
        if self.at(TokenKind::Identifier) || self.at_keyword("Any") || self.at_keyword("Self") {
            self.bump();
            if extension {
                self.generic_arguments();
                while self.at(TokenKind::Dot) && self.nth_is(1, TokenKind::Identifier) {
                    self.bump_n(2);
                    self.generic_arguments();
                }
            }
        } else {
            self.error_here("expected type name");
        }
        if self.at_generic_open() {
            children.push(self.generic_parameter_list());
        }
        if self.eat(TokenKind::Colon) {
            loop {
                match self.ty() {
                    Some(inherited) => children.push(inherited),
                    None => {
                        self.error_here("expected inherited type");
                        break;
                    }
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.where_clause();
        if self.at(TokenKind::LBrace) {
            children.push(self.braced_block(Scope::TypeBody));
        } else {
            self.error_here("expected '{' for type body");
        }
        self.finish(NodeKind::TypeDecl, start, children)
    }

    fn function_decl(&mut self, start: usize, mut children: Vec<NodeId>) -> NodeId {
        let keyword = self.peek().map(|t| t.text.clone()).unwrap_or_default();
        self.bump();
        match keyword.as_str() {
            "func" => {
                if self
                    .peek()
                    .is_some_and(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Operator))
                {
                    self.bump();
                } else {
                    self.error_here("expected function name");
                }
            }
            "init" => {
                if self.at(TokenKind::PostfixQuestion) || self.at(TokenKind::PostfixBang) {
                    self.bump();
                }
            }
            _ => {}
        }
        if self.at_generic_open() {
            children.push(self.generic_parameter_list());
        }
        if self.at(TokenKind::LParen) {
            children.push(self.parameter_clause());
        } else if keyword != "deinit" {
            self.error_here("expected parameter list");
        }
        self.effects();
        if self.eat(TokenKind::Arrow) {
            match self.ty() {
                Some(result) => children.push(result),
                None => self.error_here("expected result type"),
            }
        }
        self.where_clause();
        if self.at(TokenKind::LBrace) {
            if keyword == "subscript" {
                self.accessors_or_body(&mut children);
            } else {
                children.push(self.code_block());
            }
        }
        self.finish(NodeKind::FunctionDecl, start, children)
    }

    pub(super) fn effects(&mut self) {
        loop {
            if self.at_keyword("async") || self.at_keyword("rethrows") || self.at_ident("reasync") {
                self.bump();
            } else if self.eat_keyword("throws") {
                if self.at(TokenKind::LParen) && !self.trivia_before() {
                    self.skip_balanced();
                }
            } else {
                break;
            }
        }
    }

    fn where_clause(&mut self) {
        if !self.eat_keyword("where") {
            return;
        }
        let begin = self.pos;
        while let Some(tok) = self.peek() {
            if matches!(tok.kind, TokenKind::LBrace | TokenKind::RBrace) {
                break;
            }
            let continues_line = self
                .pos
                .checked_sub(1)
                .and_then(|p| self.code_token(p))
                .is_some_and(|t| matches!(t.kind, TokenKind::Comma | TokenKind::Colon));
            if self.pos > begin && self.newline_before() && !continues_line {
                break;
            }
            self.bump();
        }
    }

    fn at_generic_open(&self) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Operator && t.text.starts_with('<'))
            && !self.trivia_before()
    }

    fn generic_parameter_list(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        loop {
            let Some(tok) = self.peek() else {
                self.error_here("expected '>'");
                break;
            };
            match tok.kind {
                TokenKind::Operator if tok.text.starts_with('>') => {
                    self.bump();
                    break;
                }
                TokenKind::LParen | TokenKind::LBrace => {
                    self.error_here("expected '>'");
                    break;
                }
                TokenKind::Identifier => {
                    let param_start = self.pos;
                    self.bump();
                    let mut parts = Vec::new();
                    if self.eat(TokenKind::Colon) {
                        parts.extend(self.ty());
                    }
                    children.push(self.finish(NodeKind::GenericParameter, param_start, parts));
                }
                _ => self.bump(),
            }
        }
        self.finish(NodeKind::GenericParameterList, start, children)
    }

    pub(super) fn parameter_clause(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        loop {
            if self.at(TokenKind::RParen) || self.at_end() {
                break;
            }
            children.push(self.parameter());
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.at(TokenKind::RParen) || self.at_end() {
                break;
            }
            children.push(self.recover("expected ',' or ')' in parameter list"));
        }
        self.expect(TokenKind::RParen, "')'");
        self.finish(NodeKind::ParameterClause, start, children)
    }

    fn parameter(&mut self) -> NodeId {
        let start = self.pos;
        let mut children = Vec::new();
        while self.at(TokenKind::Attribute) {
            children.push(self.attribute());
        }
        let is_name = |t: Option<&Token>| {
            t.is_some_and(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword))
        };
        let names = if is_name(self.nth(0)) && self.nth_is(1, TokenKind::Colon) {
            1
        } else if is_name(self.nth(0)) && is_name(self.nth(1)) && self.nth_is(2, TokenKind::Colon)
        {
            2
        } else {
            0
        };
        if names > 0 {
            self.bump_n(names + 1);
        }
        match self.ty() {
            Some(ty) => children.push(ty),
            None if names == 0 && children.is_empty() => {
                return self.recover("expected parameter");
            }
            None => self.error_here("expected parameter type"),
        }
        if self.at_operator("...") {
            self.bump();
        }
        if self.at_operator("=") {
            self.bump();
            match self.expr(super::expr::Restrictions::NONE) {
                Some(default) => children.push(default),
                None => self.error_here("expected default value"),
            }
        }
        self.finish(NodeKind::Parameter, start, children)
    }

    fn variable_decl(&mut self, start: usize, mut children: Vec<NodeId>) -> NodeId {
        self.bump();
        loop {
            let binding_start = self.pos;
            let mut parts = Vec::new();
            if self.at(TokenKind::LParen) {
                parts.extend(self.pattern());
            } else if self
                .peek()
                .is_some_and(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword))
            {
                self.bump();
            } else {
                self.error_here("expected variable name");
                break;
            }
            let mut typed = false;
            if self.eat(TokenKind::Colon) {
                typed = true;
                match self.ty() {
                    Some(ty) => parts.push(ty),
                    None => self.error_here("expected type annotation"),
                }
            }
            let mut initialized = false;
            if self.at_operator("=") {
                initialized = true;
                self.bump();
                match self.expr(super::expr::Restrictions::NONE) {
                    Some(value) => parts.push(value),
                    None => self.error_here("expected initial value"),
                }
            }
            let body_allowed = if initialized {
                !self.newline_before()
            } else {
                typed
            };
            if self.at(TokenKind::LBrace) && body_allowed {
                self.accessors_or_body(&mut parts);
            }
            children.push(self.finish(NodeKind::PatternBinding, binding_start, parts));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.finish(NodeKind::VariableDecl, start, children)
    }

    fn accessor_block_ahead(&self) -> bool {
        let mut i = self.pos + 1;
        while self.code_token(i).is_some_and(|t| {
            t.kind == TokenKind::Attribute
                || t.is_ident("mutating")
                || t.is_ident("nonmutating")
                || t.is_ident("__consuming")
        }) {
            i += 1;
        }
        let named = self
            .code_token(i)
            .is_some_and(|t| t.kind == TokenKind::Identifier && ACCESSOR_NAMES.contains(&t.text.as_str()))
            || self.code_token(i).is_some_and(|t| t.is_keyword("init"));
        named
            && self.code_token(i + 1).is_some_and(|t| {
                matches!(
                    t.kind,
                    TokenKind::LBrace | TokenKind::RBrace | TokenKind::LParen | TokenKind::Identifier
                ) || t.is_keyword("async")
                    || t.is_keyword("throws")
            })
    }

    fn accessors_or_body(&mut self, children: &mut Vec<NodeId>) {
        if !self.accessor_block_ahead() {
            children.push(self.code_block());
            return;
        }
        self.bump();
        loop {
            if self.at(TokenKind::RBrace) || self.at_end() {
                break;
            }
            children.push(self.accessor_decl());
        }
        self.expect(TokenKind::RBrace, "'}'");
    }

    fn accessor_decl(&mut self) -> NodeId {
        let start = self.pos;
        let mut children = Vec::new();
        while self.at(TokenKind::Attribute) {
            children.push(self.attribute());
        }
        while self.at_ident("mutating") || self.at_ident("nonmutating") || self.at_ident("__consuming")
        {
            self.bump();
        }
        let named = self.peek().is_some_and(|t| {
            (t.kind == TokenKind::Identifier && ACCESSOR_NAMES.contains(&t.text.as_str()))
                || t.is_keyword("init")
        });
        if !named {
            if children.is_empty() && self.pos == start {
                return self.recover("expected accessor");
            }
            self.error_here("expected accessor");
            return self.finish(NodeKind::Error, start, children);
        }
        self.bump();
        if self.at(TokenKind::LParen) {
            self.skip_balanced();
        }
        self.effects();
        if self.at(TokenKind::LBrace) {
            children.push(self.code_block());
        }
        self.finish(NodeKind::AccessorDecl, start, children)
    }

    fn enum_case_decl(&mut self, start: usize, mut children: Vec<NodeId>) -> NodeId {
        self.bump();
        loop {
            let element_start = self.pos;
            if self
                .peek()
                .is_some_and(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword))
            {
                self.bump();
            } else {
                self.error_here("expected case name");
                break;
            }
            let mut parts = Vec::new();
            if self.at(TokenKind::LParen) {
                parts.push(self.parameter_clause());
            }
            if self.at_operator("=") {
                self.bump();
                parts.extend(self.expr(super::expr::Restrictions::NONE));
            }
            children.push(self.finish(NodeKind::EnumCaseElement, element_start, parts));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.finish(NodeKind::EnumCaseDecl, start, children)
    }

    fn type_alias_decl(&mut self, start: usize, mut children: Vec<NodeId>) -> NodeId {
        self.bump();
        if self.at(TokenKind::Identifier) {
            self.bump();
        } else {
            self.error_here("expected type name");
        }
        if self.at_generic_open() {
            children.push(self.generic_parameter_list());
        }
        if self.eat(TokenKind::Colon) {
            children.extend(self.ty());
        }
        if self.at_operator("=") {
            self.bump();
            match self.ty() {
                Some(ty) => children.push(ty),
                None => self.error_here("expected aliased type"),
            }
        }
        self.where_clause();
        self.finish(NodeKind::TypeAliasDecl, start, children)
    }

    fn operator_decl(&mut self, start: usize, children: Vec<NodeId>) -> NodeId {
        let is_group = self.at_keyword("precedencegroup");
        self.bump();
        if self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Operator | TokenKind::Identifier))
        {
            self.bump();
        }
        if is_group {
            if self.at(TokenKind::LBrace) {
                self.skip_balanced();
            }
        } else if self.eat(TokenKind::Colon) && self.at(TokenKind::Identifier) {
            self.bump();
        }
        self.finish(NodeKind::OperatorDecl, start, children)
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{NodeKind, SyntaxTree};

    fn kinds_of(source: &str) -> Vec<NodeKind> {
        let tree = SyntaxTree::parse(source);
        tree.root().descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn if_with_parenthesised_condition() {
        let tree = SyntaxTree::parse("if (x == 5) { foo() }");
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        insta::assert_snapshot!(tree.dump(), @r"
        SourceFile 0..21
          IfStmt 0..21
            ConditionList 3..11
              TupleExpr 3..11
                Argument 4..10
                  SequenceExpr 4..10
                    IdentifierExpr 4..5
                    LiteralExpr 9..10
            CodeBlock 12..21
              ExpressionStmt 14..19
                CallExpr 14..19
                  IdentifierExpr 14..17
                  ArgumentList 17..19
        ");
    }

    #[test]
    fn case_pattern_statement() {
        let tree = SyntaxTree::parse("case let .double(first, second) = value");
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        insta::assert_snapshot!(tree.dump(), @r"
        SourceFile 0..39
          CaseCondition 0..39
            CasePattern 5..31
              BindingPattern 5..31
                CallExpr 9..31
                  ImplicitMemberExpr 9..16
                  ArgumentList 16..31
                    Argument 17..22
                      IdentifierExpr 17..22
                    Argument 24..30
                      IdentifierExpr 24..30
            IdentifierExpr 34..39
        ");
    }

    #[test]
    fn declarations_with_modifiers() {
        let source = "@objc public final class Foo<T: Equatable>: Bar {\n  private(set) static var count: Int = 0\n  init?(value: Int) { }\n  var name: String { get set }\n}\n";
        let tree = SyntaxTree::parse(source);
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        let kinds = kinds_of(source);
        for expected in [
            NodeKind::Attribute,
            NodeKind::ModifierList,
            NodeKind::TypeDecl,
            NodeKind::GenericParameterList,
            NodeKind::GenericParameter,
            NodeKind::VariableDecl,
            NodeKind::PatternBinding,
            NodeKind::FunctionDecl,
            NodeKind::ParameterClause,
            NodeKind::AccessorDecl,
        ] {
            assert!(kinds.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn enum_cases_in_type_body_only() {
        let tree = SyntaxTree::parse("enum E {\n  case a, b(Int)\n  indirect case c(E)\n}\n");
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        let elements = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::EnumCaseElement)
            .count();
        assert_eq!(elements, 3);
    }

    #[test]
    fn switch_cases_hold_their_bodies() {
        let source = "switch value {\ncase .a(let x), .b(let x) where x > 0:\n  print(x)\ncase .c:\n  fallthrough\n@unknown default:\n  break\n}\n";
        let tree = SyntaxTree::parse(source);
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        let switch = tree.root().child(0).unwrap();
        let cases: Vec<_> = switch
            .children()
            .filter(|n| n.kind() == NodeKind::SwitchCase)
            .collect();
        assert_eq!(cases.len(), 3);
        assert_eq!(
            cases[0]
                .children()
                .filter(|n| n.kind() == NodeKind::CasePattern)
                .count(),
            2
        );
        assert_eq!(
            cases[1].children().last().map(|n| n.kind()),
            Some(NodeKind::ControlTransferStmt)
        );
    }

    #[test]
    fn conditions_never_take_trailing_closures() {
        let tree = SyntaxTree::parse("if let x = foo, items.isEmpty { bar { $0 } }");
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        let stmt = tree.root().child(0).unwrap();
        assert_eq!(stmt.child(0).map(|n| n.kind()), Some(NodeKind::ConditionList));
        assert_eq!(stmt.child(1).map(|n| n.kind()), Some(NodeKind::CodeBlock));
        let closures = stmt
            .descendants()
            .filter(|n| n.kind() == NodeKind::ClosureExpr)
            .count();
        assert_eq!(closures, 1);
    }

    #[test]
    fn loops_and_error_handling() {
        let source = "outer: for (i, x) in items.enumerated() where x > 0 {\n  continue outer\n}\nrepeat { n -= 1 } while (n > 0)\ndo {\n  try run()\n} catch let error as MyError {\n  throw error\n} catch {\n}\ndefer { close() }\nguard let v = v else { return }\n";
        let tree = SyntaxTree::parse(source);
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        let kinds: Vec<_> = tree.root().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ForInStmt,
                NodeKind::RepeatWhileStmt,
                NodeKind::DoStmt,
                NodeKind::DeferStmt,
                NodeKind::GuardStmt,
            ]
        );
    }

    #[test]
    fn recovers_after_garbage() {
        let tree = SyntaxTree::parse("let a = 1\n) ] garbage ?? ::\nlet b = 2\n");
        assert!(!tree.errors().is_empty());
        let root = tree.root();
        let kinds: Vec<_> = root.children().map(|n| n.kind()).collect();
        assert_eq!(kinds.first(), Some(&NodeKind::VariableDecl));
        assert_eq!(kinds.last(), Some(&NodeKind::VariableDecl));
        assert!(kinds.contains(&NodeKind::Error));
    }

    #[test]
    fn deep_nesting_terminates() {
        let source = "(".repeat(5000) + &"[".repeat(5000) + &"{".repeat(5000);
        let tree = SyntaxTree::parse(&source);
        assert!(!tree.errors().is_empty());
        assert_eq!(tree.root().span().end, source.len());
    }

    #[test]
    fn compiler_directives_are_statements() {
        let tree = SyntaxTree::parse("#if DEBUG\nlet a = 1\n#else\nlet a = 2\n#endif\n");
        assert!(tree.errors().is_empty(), "{:?}", tree.errors());
        let directives = tree
            .root()
            .children()
            .filter(|n| n.kind() == NodeKind::CompilerDirective)
            .count();
        assert_eq!(directives, 3);
    }
}
