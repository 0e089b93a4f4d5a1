//! Lossless lexer.
//!
//! Produces a token stream covering every byte of the input, trivia
//! included. Interpolated strings are split into head/middle/tail segments
//! with the interpolated expressions lexed as ordinary tokens in between;
//! a stack of open interpolations tracks bracket depth so that nested
//! interpolations and closures inside `\( ... )` terminate correctly.

use crate::span::Span;
use crate::token::{is_keyword, Token, TokenKind};
use thiserror::Error;

/// A recoverable lexing problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A string literal runs to the end of its line or of the buffer.
    #[error("unterminated string literal")]
    UnterminatedString {
        /// Span from the start of the literal segment to end of buffer.
        span: Span,
    },
    /// A block comment is never closed.
    #[error("unterminated block comment")]
    UnterminatedComment {
        /// Span from the comment opener to end of buffer.
        span: Span,
    },
}

impl LexError {
    /// Location of the problem.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::UnterminatedString { span } | Self::UnterminatedComment { span } => *span,
        }
    }
}

/// Output of [`lex`].
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Every token in source order, trivia included.
    pub tokens: Vec<Token>,
    /// Problems found while lexing.
    pub errors: Vec<LexError>,
}

impl Lexed {
    /// Concatenates the raw text of all tokens.
    #[must_use]
    pub fn reconstruct(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Lexes `source` into tokens. Never fails; problems are reported in
/// [`Lexed::errors`].
#[must_use]
pub fn lex(source: &str) -> Lexed {
    Lexer::new(source).run()
}

#[derive(Debug, Clone, Copy)]
struct Interpolation {
    hashes: usize,
    multiline: bool,
    depth: usize,
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    modes: Vec<Interpolation>,
}

fn is_operator_char(c: u8) -> bool {
    matches!(
        c,
        b'/' | b'=' | b'-' | b'+' | b'!' | b'*' | b'%' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~'
            | b'?'
    )
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
            modes: Vec::new(),
        }
    }

    fn run(mut self) -> Lexed {
        while self.pos < self.bytes.len() {
            self.next_token();
        }
        Lexed {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text = &self.src[start..self.pos];
        let token = Token {
            kind,
            text: text.to_string(),
            span: Span::new(start, self.pos),
            line: self.line,
            column: self.column,
        };
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.tokens.push(token);
    }

    fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// True when the previous token is an operand glued to the current position.
    fn follows_operand(&self) -> bool {
        self.last_token().is_some_and(|t| {
            matches!(
                t.kind,
                TokenKind::Identifier
                    | TokenKind::Keyword
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::IntegerLiteral
                    | TokenKind::FloatLiteral
                    | TokenKind::StringLiteral
                    | TokenKind::StringTail
                    | TokenKind::PostfixBang
                    | TokenKind::PostfixQuestion
            )
        })
    }

    fn next_token(&mut self) {
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return;
        };

        match c {
            '\n' => {
                self.pos += 1;
                self.push(TokenKind::Newline, start);
            }
            '\r' => {
                self.pos += if self.byte_at(self.pos + 1) == Some(b'\n') {
                    2
                } else {
                    1
                };
                self.push(TokenKind::Newline, start);
            }
            c if c.is_whitespace() => {
                while let Some(c) = self.peek_char() {
                    if c == '\n' || c == '\r' || !c.is_whitespace() {
                        break;
                    }
                    self.bump_char();
                }
                self.push(TokenKind::Whitespace, start);
            }
            '/' if self.starts_with("//") => {
                while let Some(b) = self.peek() {
                    if b == b'\n' || b == b'\r' {
                        break;
                    }
                    self.bump_char();
                }
                self.push(TokenKind::LineComment, start);
            }
            '/' if self.starts_with("/*") => self.block_comment(start),
            '"' => self.string(start, 0),
            '#' => self.pound(start),
            '@' => {
                self.pos += 1;
                if self.peek_char().is_some_and(is_ident_start) {
                    self.identifier_tail();
                    self.push(TokenKind::Attribute, start);
                } else {
                    self.push(TokenKind::Unknown, start);
                }
            }
            '0'..='9' => self.number(start),
            '$' => {
                self.pos += 1;
                self.identifier_tail();
                self.push(TokenKind::Identifier, start);
            }
            '`' => self.backtick(start),
            c if is_ident_start(c) => {
                self.identifier_tail();
                let kind = if is_keyword(&self.src[start..self.pos]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                self.push(kind, start);
            }
            '(' | '[' | '{' => {
                self.pos += 1;
                if let Some(mode) = self.modes.last_mut() {
                    mode.depth += 1;
                }
                let kind = match c {
                    '(' => TokenKind::LParen,
                    '[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                };
                self.push(kind, start);
            }
            ')' if self.modes.last().is_some_and(|m| m.depth == 0) => {
                if let Some(mode) = self.modes.pop() {
                    self.pos += 1;
                    self.string_body(start, mode.hashes, mode.multiline, false);
                }
            }
            ')' | ']' | '}' => {
                self.pos += 1;
                if let Some(mode) = self.modes.last_mut() {
                    mode.depth = mode.depth.saturating_sub(1);
                }
                let kind = match c {
                    ')' => TokenKind::RParen,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                };
                self.push(kind, start);
            }
            ',' => self.single(TokenKind::Comma, start),
            ':' => self.single(TokenKind::Colon, start),
            ';' => self.single(TokenKind::Semicolon, start),
            '\\' => self.single(TokenKind::Backslash, start),
            '.' => {
                if self.byte_at(self.pos + 1) == Some(b'.') {
                    self.pos += 1;
                    while let Some(b) = self.peek() {
                        if b == b'/' && matches!(self.byte_at(self.pos + 1), Some(b'/' | b'*')) {
                            break;
                        }
                        if b == b'.' || (is_operator_char(b) && b != b'?' && b != b'!') {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                    self.push(TokenKind::Operator, start);
                } else {
                    self.single(TokenKind::Dot, start);
                }
            }
            '!' | '?' if self.follows_operand() && self.postfix_allowed(c) => {
                let kind = if c == '!' {
                    TokenKind::PostfixBang
                } else {
                    TokenKind::PostfixQuestion
                };
                self.single(kind, start);
            }
            c if c.is_ascii() && is_operator_char(c as u8) => self.operator(start),
            _ => {
                self.bump_char();
                self.push(TokenKind::Unknown, start);
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize) {
        self.pos += 1;
        self.push(kind, start);
    }

    fn postfix_allowed(&self, c: char) -> bool {
        let next = self.byte_at(self.pos + 1);
        match c {
            '?' => next != Some(b'?'),
            _ => next != Some(b'='),
        }
    }

    fn operator(&mut self, start: usize) {
        let first = self.bytes[self.pos];
        let question_or_bang = first == b'?' || first == b'!';
        self.pos += 1;
        while let Some(b) = self.peek() {
            if !is_operator_char(b) {
                break;
            }
            if (b == b'?' || b == b'!') && !question_or_bang {
                break;
            }
            if b == b'/' && matches!(self.byte_at(self.pos + 1), Some(b'/' | b'*')) {
                break;
            }
            self.pos += 1;
        }
        let kind = if &self.src[start..self.pos] == "->" {
            TokenKind::Arrow
        } else {
            TokenKind::Operator
        };
        self.push(kind, start);
    }

    fn identifier_tail(&mut self) {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.bump_char();
        }
    }

    fn backtick(&mut self, start: usize) {
        let rest = &self.src[self.pos + 1..];
        let close = rest.find(|c| c == '`' || c == '\n');
        match close {
            Some(i) if rest.as_bytes()[i] == b'`' && i > 0 => {
                self.pos += i + 2;
                self.push(TokenKind::Identifier, start);
            }
            _ => self.single(TokenKind::Unknown, start),
        }
    }

    fn pound(&mut self, start: usize) {
        let mut hashes = 0;
        while self.byte_at(self.pos + hashes) == Some(b'#') {
            hashes += 1;
        }
        if self.byte_at(self.pos + hashes) == Some(b'"') {
            self.string(start, hashes);
            return;
        }
        self.pos += 1;
        if self.peek_char().is_some_and(is_ident_start) {
            self.identifier_tail();
            self.push(TokenKind::PoundKeyword, start);
        } else {
            self.push(TokenKind::Unknown, start);
        }
    }

    fn block_comment(&mut self, start: usize) {
        self.pos += 2;
        let mut depth = 1usize;
        while self.pos < self.bytes.len() {
            if self.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if self.starts_with("*/") {
                depth -= 1;
                self.pos += 2;
                if depth == 0 {
                    self.push(TokenKind::BlockComment, start);
                    return;
                }
            } else {
                self.bump_char();
            }
        }
        let span = Span::new(start, self.bytes.len());
        self.pos = self.bytes.len();
        self.push(TokenKind::Unterminated, start);
        self.errors.push(LexError::UnterminatedComment { span });
    }

    fn number(&mut self, start: usize) {
        let after_dot = self.last_token().is_some_and(|t| t.kind == TokenKind::Dot);
        let mut float = false;
        let radix_prefix = self
            .src
            .get(self.pos..self.pos + 2)
            .filter(|p| matches!(*p, "0x" | "0X" | "0b" | "0B" | "0o" | "0O"));

        if let Some(prefix) = radix_prefix {
            let hex = prefix.eq_ignore_ascii_case("0x");
            self.pos += 2;
            self.digits(|b| b.is_ascii_hexdigit());
            if hex {
                if !after_dot
                    && self.peek() == Some(b'.')
                    && self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_hexdigit())
                {
                    self.pos += 1;
                    self.digits(|b| b.is_ascii_hexdigit());
                    float = true;
                }
                if matches!(self.peek(), Some(b'p' | b'P')) {
                    self.exponent();
                    float = true;
                }
            }
        } else {
            self.digits(|b| b.is_ascii_digit());
            if !after_dot
                && self.peek() == Some(b'.')
                && self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit())
            {
                self.pos += 1;
                self.digits(|b| b.is_ascii_digit());
                float = true;
            }
            if matches!(self.peek(), Some(b'e' | b'E')) {
                let next = self.byte_at(self.pos + 1);
                let signed_digit = matches!(next, Some(b'+' | b'-'))
                    && self.byte_at(self.pos + 2).is_some_and(|b| b.is_ascii_digit());
                if next.is_some_and(|b| b.is_ascii_digit()) || signed_digit {
                    self.exponent();
                    float = true;
                }
            }
        }
        // Malformed suffixes stay glued to the literal.
        self.identifier_tail();
        let kind = if float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        self.push(kind, start);
    }

    fn digits(&mut self, accept: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(|b| b == b'_' || accept(b)) {
            self.pos += 1;
        }
    }

    fn exponent(&mut self) {
        self.pos += 1;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        self.digits(|b| b.is_ascii_digit());
    }

    fn string(&mut self, start: usize, hashes: usize) {
        self.pos += hashes;
        let multiline = self.starts_with("\"\"\"");
        self.pos += if multiline { 3 } else { 1 };
        self.string_body(start, hashes, multiline, true);
    }

    /// Scans string content from the current position. `start` is where the
    /// segment token begins (the opening delimiter, or the `)` closing an
    /// interpolation).
    fn string_body(&mut self, start: usize, hashes: usize, multiline: bool, first: bool) {
        loop {
            let Some(b) = self.peek() else {
                self.unterminated_string(start);
                return;
            };
            match b {
                b'\\' if self.hashes_at(self.pos + 1, hashes) => {
                    let after = self.pos + 1 + hashes;
                    if self.byte_at(after) == Some(b'(') {
                        self.pos = after + 1;
                        let kind = if first {
                            TokenKind::StringHead
                        } else {
                            TokenKind::StringMiddle
                        };
                        self.push(kind, start);
                        self.modes.push(Interpolation {
                            hashes,
                            multiline,
                            depth: 0,
                        });
                        return;
                    }
                    self.pos = after;
                    if self.peek().is_some_and(|b| b != b'\n' && b != b'\r') || multiline {
                        self.bump_char();
                    }
                }
                b'"' => {
                    let quote_len = if multiline { 3 } else { 1 };
                    let closes = (!multiline || self.starts_with("\"\"\""))
                        && self.hashes_at(self.pos + quote_len, hashes);
                    if closes {
                        self.pos += quote_len + hashes;
                        let kind = if first {
                            TokenKind::StringLiteral
                        } else {
                            TokenKind::StringTail
                        };
                        self.push(kind, start);
                        return;
                    }
                    self.pos += 1;
                }
                b'\n' | b'\r' if !multiline => {
                    self.unterminated_string(start);
                    return;
                }
                _ => self.bump_char(),
            }
        }
    }

    fn hashes_at(&self, offset: usize, count: usize) -> bool {
        (0..count).all(|i| self.byte_at(offset + i) == Some(b'#'))
    }

    fn unterminated_string(&mut self, start: usize) {
        let span = Span::new(start, self.bytes.len());
        self.pos = self.bytes.len();
        self.modes.clear();
        self.push(TokenKind::Unterminated, start);
        self.errors.push(LexError::UnterminatedString { span });
    }
}
