//! Expressions, patterns and types.

use super::kind::NodeKind;
use super::parser::{Parser, STATEMENT_KEYWORDS};
use super::tree::NodeId;
use crate::token::TokenKind;

/// Context flags threaded through expression parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Restrictions {
    /// A `{` after an operand ends the expression instead of opening a
    /// trailing closure (conditions, switch subjects, loop sequences).
    pub no_trailing_closure: bool,
    /// Parsing a pattern: `let`/`var` bind, `=` ends the pattern.
    pub pattern: bool,
}

impl Restrictions {
    pub const NONE: Self = Self {
        no_trailing_closure: false,
        pattern: false,
    };
    pub const NO_TRAILING_CLOSURE: Self = Self {
        no_trailing_closure: true,
        pattern: false,
    };
    pub const PATTERN: Self = Self {
        no_trailing_closure: true,
        pattern: true,
    };
}

/// Longest token run tried as an explicit generic argument clause.
const GENERIC_LOOKAHEAD: usize = 64;

/// Longest token run scanned for a closure's `in`.
const SIGNATURE_LOOKAHEAD: usize = 256;

impl Parser<'_> {
    pub(super) fn can_start_expr(&self) -> bool {
        let Some(tok) = self.peek() else {
            return false;
        };
        match tok.kind {
            TokenKind::Identifier
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::StringHead
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Dot
            | TokenKind::Backslash
            | TokenKind::PoundKeyword => true,
            TokenKind::Operator => tok.text != "=",
            TokenKind::Keyword => matches!(
                tok.text.as_str(),
                "self"
                    | "Self"
                    | "super"
                    | "init"
                    | "Any"
                    | "true"
                    | "false"
                    | "nil"
                    | "try"
                    | "await"
                    | "if"
                    | "switch"
            ),
            _ => false,
        }
    }

    /// Parses an expression, or returns `None` without consuming anything
    /// when the current token cannot start one.
    pub(super) fn expr(&mut self, r: Restrictions) -> Option<NodeId> {
        if !self.can_start_expr() {
            return None;
        }
        match self.nested(|p| p.sequence(r)) {
            Some(expr) => expr,
            None => Some(self.recover("expression nested too deeply")),
        }
    }

    fn sequence(&mut self, r: Restrictions) -> Option<NodeId> {
        let start = self.pos;
        let first = self.prefix(r)?;
        let mut elements = vec![first];
        while let Some(tok) = self.peek() {
            if tok.is_keyword("is") || tok.is_keyword("as") {
                let cast = tok.is_keyword("as");
                self.bump();
                if cast
                    && (self.at(TokenKind::PostfixQuestion) || self.at(TokenKind::PostfixBang))
                {
                    self.bump();
                }
                match self.ty() {
                    Some(ty) => elements.push(ty),
                    None => {
                        self.error_here("expected type after cast");
                        break;
                    }
                }
                continue;
            }

            if tok.kind != TokenKind::Operator || !self.binary_position() {
                break;
            }
            if r.pattern && tok.text == "=" {
                break;
            }
            let ternary = tok.text == "?";
            self.bump();
            if ternary {
                let branch = Restrictions {
                    pattern: false,
                    ..r
                };
                match self.expr(branch) {
                    Some(then) => elements.push(then),
                    None => self.error_here("expected expression in ternary"),
                }
                if !self.expect(TokenKind::Colon, "':' in ternary expression") {
                    break;
                }
            }
            match self.prefix(r) {
                Some(operand) => elements.push(operand),
                None => {
                    self.error_here("expected expression after operator");
                    break;
                }
            }
        }
        if elements.len() == 1 {
            Some(first)
        } else {
            Some(self.finish(NodeKind::SequenceExpr, start, elements))
        }
    }

    /// An operator surrounded by whitespace on both sides or on neither.
    fn binary_position(&self) -> bool {
        self.trivia_before() == self.trivia_after_at(self.pos)
    }

    fn prefix(&mut self, r: Restrictions) -> Option<NodeId> {
        let start = self.pos;
        let tok = self.peek()?;

        if tok.is_keyword("try") || tok.is_keyword("await") {
            let is_try = tok.is_keyword("try");
            self.bump();
            if is_try
                && (self.at(TokenKind::PostfixQuestion) || self.at(TokenKind::PostfixBang))
                && !self.trivia_before()
            {
                self.bump();
            }
            let mut children = Vec::new();
            match self.expr(r) {
                Some(inner) => children.push(inner),
                None => self.error_here("expected expression after effect marker"),
            }
            return Some(self.finish(NodeKind::TryExpr, start, children));
        }

        if tok.kind == TokenKind::Operator && tok.text != "=" {
            self.bump();
            let operand = match self.nested(|p| p.prefix(r)) {
                Some(operand) => operand,
                None => Some(self.recover("expression nested too deeply")),
            };
            if operand.is_none() {
                self.error_here("expected operand after prefix operator");
            }
            return Some(self.finish(NodeKind::PrefixExpr, start, operand.into_iter().collect()));
        }

        self.postfix(r)
    }

    fn postfix(&mut self, r: Restrictions) -> Option<NodeId> {
        let start = self.pos;
        let mut expr = self.primary(r)?;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Dot => {
                    let named = self.nth(1).is_some_and(|t| {
                        matches!(
                            t.kind,
                            TokenKind::Identifier | TokenKind::Keyword | TokenKind::IntegerLiteral
                        )
                    });
                    if !named {
                        break;
                    }
                    self.bump_n(2);
                    self.generic_arguments();
                    expr = self.finish(NodeKind::MemberAccessExpr, start, vec![expr]);
                }
                TokenKind::LParen if !self.newline_before() => {
                    let args = self.argument_list(TokenKind::RParen, r);
                    let mut children = vec![expr, args];
                    self.trailing_closures(r, &mut children);
                    expr = self.finish(NodeKind::CallExpr, start, children);
                }
                TokenKind::LBracket if !self.newline_before() => {
                    let args = self.argument_list(TokenKind::RBracket, r);
                    expr = self.finish(NodeKind::SubscriptExpr, start, vec![expr, args]);
                }
                TokenKind::LBrace
                    if !self.newline_before()
                        && !r.no_trailing_closure
                        && self.takes_trailing_closure(expr) =>
                {
                    let mut children = vec![expr];
                    self.trailing_closures(r, &mut children);
                    expr = self.finish(NodeKind::CallExpr, start, children);
                }
                TokenKind::PostfixBang => {
                    self.bump();
                    expr = self.finish(NodeKind::ForceUnwrapExpr, start, vec![expr]);
                }
                TokenKind::PostfixQuestion => {
                    self.bump();
                    expr = self.finish(NodeKind::OptionalChainExpr, start, vec![expr]);
                }
                TokenKind::Operator
                    if tok.text != "="
                        && !self.trivia_before()
                        && self.postfix_operator_shape() =>
                {
                    self.bump();
                    expr = self.finish(NodeKind::PostfixExpr, start, vec![expr]);
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn takes_trailing_closure(&self, callee: NodeId) -> bool {
        matches!(
            self.nodes[callee.index()].kind,
            NodeKind::IdentifierExpr
                | NodeKind::MemberAccessExpr
                | NodeKind::ImplicitMemberExpr
                | NodeKind::SubscriptExpr
                | NodeKind::ForceUnwrapExpr
                | NodeKind::OptionalChainExpr
        )
    }

    /// A glued operator followed by whitespace or a closing token.
    fn postfix_operator_shape(&self) -> bool {
        self.trivia_after_at(self.pos)
            || self.nth(1).is_some_and(|t| {
                t.kind.is_close_delimiter()
                    || matches!(
                        t.kind,
                        TokenKind::Comma | TokenKind::Semicolon | TokenKind::Dot
                    )
            })
    }

    fn primary(&mut self, r: Restrictions) -> Option<NodeId> {
        let start = self.pos;
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Identifier => {
                self.bump();
                self.generic_arguments();
                Some(self.finish(NodeKind::IdentifierExpr, start, Vec::new()))
            }
            TokenKind::Keyword => match tok.text.as_str() {
                "self" | "Self" | "super" | "init" | "Any" => {
                    self.bump();
                    self.generic_arguments();
                    Some(self.finish(NodeKind::IdentifierExpr, start, Vec::new()))
                }
                "true" | "false" | "nil" => {
                    self.bump();
                    Some(self.finish(NodeKind::LiteralExpr, start, Vec::new()))
                }
                "if" => Some(self.if_stmt(start)),
                "switch" => Some(self.switch_stmt(start)),
                "let" | "var" if r.pattern => self.pattern(),
                _ => None,
            },
            TokenKind::IntegerLiteral | TokenKind::FloatLiteral => {
                self.bump();
                Some(self.finish(NodeKind::LiteralExpr, start, Vec::new()))
            }
            TokenKind::StringLiteral => {
                self.bump();
                Some(self.finish(NodeKind::StringLiteralExpr, start, Vec::new()))
            }
            TokenKind::StringHead => Some(self.interpolated_string()),
            TokenKind::Dot => {
                self.bump();
                let named = self.peek().is_some_and(|t| {
                    matches!(
                        t.kind,
                        TokenKind::Identifier | TokenKind::Keyword | TokenKind::IntegerLiteral
                    )
                });
                if named && !self.trivia_before() {
                    self.bump();
                } else {
                    self.error_here("expected member name");
                }
                Some(self.finish(NodeKind::ImplicitMemberExpr, start, Vec::new()))
            }
            TokenKind::LParen => {
                let elements = self.arguments(TokenKind::RParen, r);
                Some(self.finish(NodeKind::TupleExpr, start, elements))
            }
            TokenKind::LBracket => Some(self.collection()),
            TokenKind::LBrace => Some(self.closure()),
            TokenKind::Backslash => Some(self.key_path()),
            TokenKind::PoundKeyword => {
                self.bump();
                if self.at(TokenKind::LParen) && !self.trivia_before() {
                    self.skip_balanced();
                }
                Some(self.finish(NodeKind::PoundExpr, start, Vec::new()))
            }
            _ => None,
        }
    }

    fn argument_list(&mut self, close: TokenKind, r: Restrictions) -> NodeId {
        let start = self.pos;
        let arguments = self.arguments(close, r);
        self.finish(NodeKind::ArgumentList, start, arguments)
    }

    /// Consumes `open ... close` and returns one `Argument` per element.
    fn arguments(&mut self, close: TokenKind, r: Restrictions) -> Vec<NodeId> {
        self.bump();
        let inner = Restrictions {
            no_trailing_closure: r.pattern,
            pattern: r.pattern,
        };
        let mut arguments = Vec::new();
        loop {
            if self.at(close) || self.at_end() {
                break;
            }
            arguments.push(self.argument(close, inner));
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.at(close) || self.at_end() {
                break;
            }
            arguments.push(self.recover("expected ',' or closing delimiter"));
        }
        self.expect(close, "closing delimiter");
        arguments
    }

    fn argument(&mut self, close: TokenKind, r: Restrictions) -> NodeId {
        let start = self.pos;
        let labeled = self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword))
            && self.nth_is(1, TokenKind::Colon);
        if labeled {
            self.bump_n(2);
        }

        let mut children = Vec::new();
        let ends_here = self.at(close)
            || self.at(TokenKind::Comma)
            || matches!(
                self.peek().map(|t| t.kind),
                Some(TokenKind::StringMiddle | TokenKind::StringTail)
            );
        if !ends_here {
            let bare_operator = self.at(TokenKind::Operator)
                && self
                    .nth(1)
                    .is_some_and(|t| t.kind == close || t.kind == TokenKind::Comma);
            if bare_operator {
                self.bump();
            } else {
                let value = if r.pattern {
                    self.pattern()
                } else {
                    self.expr(r)
                };
                match value {
                    Some(value) => children.push(value),
                    None if self.pos == start => return self.recover("expected argument"),
                    None => self.error_here("expected argument value"),
                }
            }
        }
        self.finish(NodeKind::Argument, start, children)
    }

    fn trailing_closures(&mut self, r: Restrictions, children: &mut Vec<NodeId>) {
        if r.no_trailing_closure || !self.at(TokenKind::LBrace) || self.newline_before() {
            return;
        }
        children.push(self.closure());
        loop {
            let labeled = self.at(TokenKind::Identifier)
                && self.nth_is(1, TokenKind::Colon)
                && self.nth_is(2, TokenKind::LBrace);
            if !labeled {
                break;
            }
            let start = self.pos;
            self.bump_n(2);
            let closure = self.closure();
            children.push(self.finish(NodeKind::Argument, start, vec![closure]));
        }
    }

    fn collection(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        if self.at(TokenKind::Colon) && self.nth_is(1, TokenKind::RBracket) {
            self.bump_n(2);
            return self.finish(NodeKind::CollectionExpr, start, children);
        }
        loop {
            if self.at(TokenKind::RBracket) || self.at_end() {
                break;
            }
            match self.expr(Restrictions::NONE) {
                Some(element) => children.push(element),
                None => {
                    children.push(self.recover("expected collection element"));
                    continue;
                }
            }
            if self.eat(TokenKind::Colon) {
                match self.expr(Restrictions::NONE) {
                    Some(value) => children.push(value),
                    None => self.error_here("expected dictionary value"),
                }
            }
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.at(TokenKind::RBracket) || self.at_end() {
                break;
            }
            children.push(self.recover("expected ',' or ']'"));
        }
        self.expect(TokenKind::RBracket, "']'");
        self.finish(NodeKind::CollectionExpr, start, children)
    }

    pub(super) fn closure(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        if self.closure_signature_ahead() {
            children.push(self.closure_signature());
        }
        children.extend(self.closure_items());
        self.expect(TokenKind::RBrace, "'}' to close closure");
        self.finish(NodeKind::ClosureExpr, start, children)
    }

    fn closure_signature_ahead(&self) -> bool {
        let mut depth = 0usize;
        for offset in 0..SIGNATURE_LOOKAHEAD {
            let Some(tok) = self.nth(offset) else {
                return false;
            };
            match tok.kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::LBrace | TokenKind::RBrace => return false,
                TokenKind::Keyword if depth == 0 => {
                    if tok.text == "in" {
                        return true;
                    }
                    if STATEMENT_KEYWORDS.contains(&tok.text.as_str()) {
                        return false;
                    }
                }
                TokenKind::Operator if depth == 0 && tok.text == "=" => return false,
                _ => {}
            }
        }
        false
    }

    fn closure_signature(&mut self) -> NodeId {
        let start = self.pos;
        let mut children = Vec::new();
        while self.at(TokenKind::Attribute) {
            children.push(self.attribute());
        }
        if self.at(TokenKind::LBracket) {
            self.skip_balanced();
        }
        if self.at(TokenKind::LParen) {
            children.push(self.parameter_clause());
        }
        self.effects();
        if self.eat(TokenKind::Arrow) {
            children.extend(self.ty());
        }
        while !self.at_end() && !self.at_keyword("in") {
            self.bump();
        }
        self.eat_keyword("in");
        self.finish(NodeKind::ClosureSignature, start, children)
    }

    fn interpolated_string(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        let mut children = Vec::new();
        loop {
            loop {
                let segment_end = matches!(
                    self.peek().map(|t| t.kind),
                    None | Some(TokenKind::StringMiddle | TokenKind::StringTail)
                );
                if segment_end {
                    break;
                }
                children.push(self.argument(TokenKind::StringTail, Restrictions::NONE));
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                let segment_end = matches!(
                    self.peek().map(|t| t.kind),
                    None | Some(TokenKind::StringMiddle | TokenKind::StringTail)
                );
                if !segment_end {
                    children.push(self.recover("expected ')' to close interpolation"));
                }
            }
            if self.eat(TokenKind::StringMiddle) {
                continue;
            }
            if !self.eat(TokenKind::StringTail) {
                self.error_here("unterminated string interpolation");
            }
            break;
        }
        self.finish(NodeKind::StringLiteralExpr, start, children)
    }

    fn key_path(&mut self) -> NodeId {
        let start = self.pos;
        self.bump();
        if self.at(TokenKind::Identifier) && !self.trivia_before() {
            self.bump();
            self.generic_arguments();
        }
        loop {
            if self.trivia_before() {
                break;
            }
            if self.at(TokenKind::Dot) {
                self.bump();
                let named = self.peek().is_some_and(|t| {
                    matches!(
                        t.kind,
                        TokenKind::Identifier | TokenKind::Keyword | TokenKind::IntegerLiteral
                    )
                });
                if named && !self.trivia_before() {
                    self.bump();
                }
            } else if self.at(TokenKind::PostfixQuestion) || self.at(TokenKind::PostfixBang) {
                self.bump();
            } else if self.at(TokenKind::LBracket) {
                self.skip_balanced();
            } else {
                break;
            }
        }
        self.finish(NodeKind::KeyPathExpr, start, Vec::new())
    }

    /// Consumes an explicit generic argument clause (`<Int, [String]>`) glued
    /// to the previous token, if the lookahead is unambiguous.
    pub(super) fn generic_arguments(&mut self) -> bool {
        let opens = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Operator && t.text.starts_with('<'));
        if !opens || self.trivia_before() {
            return false;
        }
        let mut depth = 0i32;
        let mut end = None;
        for offset in 0..GENERIC_LOOKAHEAD {
            let Some(tok) = self.nth(offset) else {
                return false;
            };
            if offset > 0 && self.newline_before_at(self.pos + offset) {
                return false;
            }
            match tok.kind {
                TokenKind::Operator => {
                    for c in tok.text.chars() {
                        match c {
                            '<' => depth += 1,
                            '>' => depth -= 1,
                            '?' | '!' | '&' => {}
                            _ => return false,
                        }
                        if depth < 0 {
                            return false;
                        }
                    }
                    if depth == 0 {
                        end = Some(offset + 1);
                        break;
                    }
                }
                TokenKind::Identifier
                | TokenKind::Keyword
                | TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::Arrow
                | TokenKind::PostfixQuestion
                | TokenKind::PostfixBang => {}
                _ => return false,
            }
        }
        let Some(end) = end else {
            return false;
        };
        let operand_follows = self.nth(end).is_some_and(|t| {
            matches!(
                t.kind,
                TokenKind::Identifier
                    | TokenKind::IntegerLiteral
                    | TokenKind::FloatLiteral
                    | TokenKind::StringLiteral
                    | TokenKind::StringHead
            )
        }) && !self.newline_before_at(self.pos + end);
        if operand_follows {
            return false;
        }
        self.bump_n(end);
        true
    }

    // ---- patterns --------------------------------------------------------

    /// Parses a pattern: `let`/`var` bindings, `is` casts, or an expression
    /// pattern (`.some(let x)`, `(a, _)`, `1...5`).
    pub(super) fn pattern(&mut self) -> Option<NodeId> {
        let Some(tok) = self.peek() else {
            return None;
        };
        let binds = tok.is_keyword("let") || tok.is_keyword("var");
        if !binds && !tok.is_keyword("is") && !self.can_start_expr() {
            return None;
        }
        match self.nested(|p| p.pattern_inner(binds)) {
            Some(pattern) => pattern,
            None => Some(self.recover("pattern nested too deeply")),
        }
    }

    fn pattern_inner(&mut self, binds: bool) -> Option<NodeId> {
        let start = self.pos;
        if binds {
            self.bump();
            let inner = self.pattern();
            if inner.is_none() {
                self.error_here("expected pattern after binding keyword");
            }
            return Some(self.finish(NodeKind::BindingPattern, start, inner.into_iter().collect()));
        }
        if self.eat_keyword("is") {
            let ty = self.ty();
            if ty.is_none() {
                self.error_here("expected type after 'is'");
            }
            return Some(self.finish(NodeKind::CastPattern, start, ty.into_iter().collect()));
        }
        self.sequence(Restrictions::PATTERN)
    }

    // ---- types -----------------------------------------------------------

    /// Parses a type annotation, or returns `None` without consuming anything
    /// when the current token cannot start one.
    pub(super) fn ty(&mut self) -> Option<NodeId> {
        self.peek()?;
        match self.nested(Self::ty_inner) {
            Some(ty) => ty,
            None => Some(self.recover("type nested too deeply")),
        }
    }

    fn ty_inner(&mut self) -> Option<NodeId> {
        let start = self.pos;
        let mut children = Vec::new();

        loop {
            if self.at(TokenKind::Attribute) {
                self.bump();
                if self.at(TokenKind::LParen) && !self.trivia_before() {
                    self.skip_balanced();
                }
                continue;
            }
            let specifier = self.at_keyword("inout")
                || ["some", "any", "borrowing", "consuming", "isolated", "sending", "__owned"]
                    .iter()
                    .any(|s| self.at_ident(s));
            let operand_follows = self.nth(1).is_some_and(|t| {
                matches!(
                    t.kind,
                    TokenKind::Identifier
                        | TokenKind::Keyword
                        | TokenKind::LParen
                        | TokenKind::LBracket
                )
            });
            if specifier && operand_follows {
                self.bump();
                continue;
            }
            break;
        }

        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Identifier | TokenKind::Keyword
                if tok.kind == TokenKind::Identifier
                    || matches!(tok.text.as_str(), "Self" | "Any" | "self") =>
            {
                self.bump();
                self.generic_arguments();
                while self.at(TokenKind::Dot)
                    && self.nth(1).is_some_and(|t| {
                        matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword)
                    })
                {
                    self.bump_n(2);
                    self.generic_arguments();
                }
            }
            TokenKind::LParen => {
                self.bump();
                loop {
                    if self.at(TokenKind::RParen) || self.at_end() {
                        break;
                    }
                    let name = |t: Option<&crate::token::Token>| {
                        t.is_some_and(|t| {
                            matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword)
                        })
                    };
                    if name(self.nth(0)) && self.nth_is(1, TokenKind::Colon) {
                        self.bump_n(2);
                    } else if name(self.nth(0))
                        && name(self.nth(1))
                        && self.nth_is(2, TokenKind::Colon)
                    {
                        self.bump_n(3);
                    }
                    match self.ty() {
                        Some(element) => children.push(element),
                        None if self.at(TokenKind::Comma) => {}
                        None => {
                            children.push(self.recover("expected type"));
                            continue;
                        }
                    }
                    if self.at_operator("...") {
                        self.bump();
                    }
                    if self.eat(TokenKind::Comma) {
                        continue;
                    }
                    if !self.at(TokenKind::RParen) && !self.at_end() {
                        children.push(self.recover("expected ',' or ')' in tuple type"));
                    }
                }
                self.expect(TokenKind::RParen, "')'");
            }
            TokenKind::LBracket => {
                self.bump();
                match self.ty() {
                    Some(element) => children.push(element),
                    None => self.error_here("expected element type"),
                }
                if self.eat(TokenKind::Colon) {
                    match self.ty() {
                        Some(value) => children.push(value),
                        None => self.error_here("expected value type"),
                    }
                }
                self.expect(TokenKind::RBracket, "']'");
            }
            _ if self.pos == start => return None,
            _ => self.error_here("expected type"),
        }

        loop {
            let Some(tok) = self.peek() else { break };
            let glued = !self.trivia_before();
            let optional_mark = matches!(tok.kind, TokenKind::PostfixQuestion | TokenKind::PostfixBang)
                || (tok.kind == TokenKind::Operator
                    && tok.text.chars().all(|c| c == '?' || c == '!'));
            if optional_mark && glued {
                self.bump();
            } else if tok.kind == TokenKind::Dot
                && self
                    .nth(1)
                    .is_some_and(|t| t.is_ident("Type") || t.is_ident("Protocol"))
            {
                self.bump_n(2);
            } else if tok.is_operator("&") {
                self.bump();
                children.extend(self.ty());
            } else if (tok.is_keyword("async") || tok.is_keyword("throws"))
                && self.effects_then_arrow()
            {
                self.effects();
            } else if tok.kind == TokenKind::Arrow {
                self.bump();
                match self.ty() {
                    Some(result) => children.push(result),
                    None => self.error_here("expected result type"),
                }
            } else {
                break;
            }
        }
        Some(self.finish(NodeKind::Type, start, children))
    }

    fn effects_then_arrow(&self) -> bool {
        (0..4)
            .map(|n| self.nth(n))
            .take_while(Option::is_some)
            .flatten()
            .find(|t| !(t.is_keyword("async") || t.is_keyword("throws")))
            .is_some_and(|t| t.kind == TokenKind::Arrow)
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{NodeKind, SyntaxTree};

    fn tree(source: &str) -> SyntaxTree {
        let tree = SyntaxTree::parse(source);
        assert!(tree.errors().is_empty(), "{source}: {:?}", tree.errors());
        tree
    }

    fn count(tree: &SyntaxTree, kind: NodeKind) -> usize {
        tree.root().descendants().filter(|n| n.kind() == kind).count()
    }

    #[test]
    fn trailing_closures_and_labels() {
        let t = tree("UIView.animate(withDuration: 1) {\n  a()\n} completion: { _ in\n  b()\n}\n");
        let call = t.root().child(0).and_then(|s| s.child(0)).unwrap();
        assert_eq!(call.kind(), NodeKind::CallExpr);
        let kinds: Vec<_> = call.children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::MemberAccessExpr,
                NodeKind::ArgumentList,
                NodeKind::ClosureExpr,
                NodeKind::Argument,
            ]
        );
        assert_eq!(count(&t, NodeKind::ClosureSignature), 1);
    }

    #[test]
    fn ternary_and_casts() {
        let t = tree("let x = a ? b as! Int : c is String\n");
        let seq = t
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::SequenceExpr)
            .unwrap();
        assert!(seq.direct_tokens().any(|(_, tok)| tok.text == "?"));
        assert!(seq.direct_tokens().any(|(_, tok)| tok.text == ":"));
    }

    #[test]
    fn generic_arguments_versus_comparison() {
        let t = tree("let a = Array<Int>()\nlet b = x<y\n");
        assert_eq!(count(&t, NodeKind::CallExpr), 1);
        assert_eq!(count(&t, NodeKind::SequenceExpr), 1);
    }

    #[test]
    fn optional_chains_and_force_unwraps() {
        let t = tree("let v = a?.b!.c?[0]\n");
        assert_eq!(count(&t, NodeKind::OptionalChainExpr), 2);
        assert_eq!(count(&t, NodeKind::ForceUnwrapExpr), 1);
        assert_eq!(count(&t, NodeKind::SubscriptExpr), 1);
    }

    #[test]
    fn interpolation_holds_expressions() {
        let t = tree("let s = \"a \\(b.count) c \\(f { $0 })\"\n");
        let string = t
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::StringLiteralExpr)
            .unwrap();
        assert_eq!(string.children().len(), 2);
        assert_eq!(count(&t, NodeKind::ClosureExpr), 1);
    }

    #[test]
    fn types_with_optionals_and_functions() {
        let t = tree("var a: [String: Int]!\nvar b: Array<Int>?\nvar c: (Int, String) -> Void\nvar d: some View\n");
        assert!(count(&t, NodeKind::Type) >= 4);
        let first = t
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::Type)
            .unwrap();
        assert_eq!(first.last_token().map(|(_, tok)| tok.text.as_str()), Some("!"));
    }

    #[test]
    fn patterns_bind_per_element() {
        let t = tree("if case .some(let x) = y, case let (a, b) = pair { }\n");
        assert_eq!(count(&t, NodeKind::CaseCondition), 2);
        assert_eq!(count(&t, NodeKind::BindingPattern), 2);
    }

    #[test]
    fn closures_without_signatures() {
        let t = tree("let f = { x = 1 }\nlet g = { [weak self] (a: Int) -> Int in a }\n");
        assert_eq!(count(&t, NodeKind::ClosureExpr), 2);
        assert_eq!(count(&t, NodeKind::ClosureSignature), 1);
    }

    #[test]
    fn key_paths_and_pound_expressions() {
        let t = tree("let k = \\Person.name\nlet s = #selector(tap(_:))\nif #available(iOS 13, *) { }\n");
        assert_eq!(count(&t, NodeKind::KeyPathExpr), 1);
        assert_eq!(count(&t, NodeKind::PoundExpr), 2);
    }
}
