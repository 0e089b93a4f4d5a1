//! Token types produced by the lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Kind of a lexed token, trivia included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Plain, backticked, `$`-prefixed identifiers and `_`.
    Identifier,
    /// Reserved word (`func`, `let`, `if`, ...).
    Keyword,
    /// `@name` attribute marker.
    Attribute,
    /// `#name` directive or literal (`#if`, `#selector`, `#file`).
    PoundKeyword,
    /// Integer literal, digit separators included.
    IntegerLiteral,
    /// Floating point literal.
    FloatLiteral,
    /// A complete string literal without interpolation.
    StringLiteral,
    /// Opening segment of an interpolated string, up to and including `\(`.
    StringHead,
    /// Segment between two interpolations, from `)` up to and including `\(`.
    StringMiddle,
    /// Closing segment of an interpolated string, from `)` to the closing quote.
    StringTail,
    /// Operator (`+`, `==`, `??`, `...`, prefix `!`).
    Operator,
    /// `->`
    Arrow,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `\` outside of string literals (key paths).
    Backslash,
    /// `!` attached to the preceding operand (`x!`, `try!`, `as!`).
    PostfixBang,
    /// `?` attached to the preceding operand (`x?.y`, `try?`, `Int?`).
    PostfixQuestion,
    /// Any character the lexer does not recognize.
    Unknown,
    /// Spaces and tabs.
    Whitespace,
    /// A single line break (`\n` or `\r\n`).
    Newline,
    /// `// ...` up to, not including, the line break.
    LineComment,
    /// `/* ... */`, possibly nested.
    BlockComment,
    /// Synthetic trivia covering an unterminated literal or comment to end of buffer.
    Unterminated,
}

/// Coarse token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    /// Identifiers and attribute/pound names.
    Identifier,
    /// Reserved words.
    Keyword,
    /// Brackets, separators and operators.
    Punctuation,
    /// Numeric and string literals.
    Literal,
    /// Whitespace, line breaks and comments.
    Trivia,
}

impl TokenKind {
    /// Returns true for whitespace, comments and synthetic trivia.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::Newline
                | Self::LineComment
                | Self::BlockComment
                | Self::Unterminated
        )
    }

    /// Returns true for comment trivia.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns true for any string literal segment.
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(
            self,
            Self::StringLiteral | Self::StringHead | Self::StringMiddle | Self::StringTail
        )
    }

    /// Returns true for opening brackets.
    #[must_use]
    pub const fn is_open_delimiter(self) -> bool {
        matches!(self, Self::LParen | Self::LBrace | Self::LBracket)
    }

    /// Returns true for closing brackets.
    #[must_use]
    pub const fn is_close_delimiter(self) -> bool {
        matches!(self, Self::RParen | Self::RBrace | Self::RBracket)
    }

    /// Coarse category of this kind.
    #[must_use]
    pub const fn category(self) -> TokenCategory {
        match self {
            Self::Identifier | Self::Attribute | Self::PoundKeyword | Self::Unknown => {
                TokenCategory::Identifier
            }
            Self::Keyword => TokenCategory::Keyword,
            Self::IntegerLiteral
            | Self::FloatLiteral
            | Self::StringLiteral
            | Self::StringHead
            | Self::StringMiddle
            | Self::StringTail => TokenCategory::Literal,
            Self::Whitespace
            | Self::Newline
            | Self::LineComment
            | Self::BlockComment
            | Self::Unterminated => TokenCategory::Trivia,
            _ => TokenCategory::Punctuation,
        }
    }
}

/// A lexed token with its raw text and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Kind of the token.
    pub kind: TokenKind,
    /// Raw source text.
    pub text: String,
    /// Byte span in the source buffer.
    pub span: Span,
    /// Line of the first byte (1-indexed).
    pub line: u32,
    /// Column of the first byte in characters (1-indexed).
    pub column: u32,
}

impl Token {
    /// Returns true if this is the keyword `kw`.
    #[must_use]
    pub fn is_keyword(&self, kw: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == kw
    }

    /// Returns true if this is an identifier spelled `name`.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }

    /// Returns true if this is an operator spelled `op`.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Returns true for trivia tokens.
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

/// Reserved words. Contextual words (`open`, `final`, `get`, ...) lex as identifiers.
pub const KEYWORDS: &[&str] = &[
    "actor",
    "associatedtype",
    "as",
    "Any",
    "async",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "continue",
    "default",
    "defer",
    "deinit",
    "do",
    "else",
    "enum",
    "extension",
    "fallthrough",
    "false",
    "fileprivate",
    "for",
    "func",
    "guard",
    "if",
    "import",
    "in",
    "init",
    "inout",
    "internal",
    "is",
    "let",
    "nil",
    "operator",
    "precedencegroup",
    "private",
    "protocol",
    "public",
    "repeat",
    "rethrows",
    "return",
    "self",
    "Self",
    "static",
    "struct",
    "subscript",
    "super",
    "switch",
    "throw",
    "throws",
    "true",
    "try",
    "typealias",
    "var",
    "where",
    "while",
];

/// Returns true if `word` is a reserved word.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Access-level modifiers, including the setter forms written as `private(set)`.
pub const ACCESS_MODIFIERS: &[&str] = &["open", "public", "internal", "fileprivate", "private"];

/// Declaration modifiers that are not access levels.
pub const OTHER_MODIFIERS: &[&str] = &[
    "static",
    "class",
    "final",
    "override",
    "required",
    "convenience",
    "mutating",
    "nonmutating",
    "lazy",
    "weak",
    "unowned",
    "dynamic",
    "optional",
    "indirect",
    "nonisolated",
    "prefix",
    "postfix",
    "infix",
    "distributed",
];

/// Returns true if `word` can appear as a declaration modifier.
#[must_use]
pub fn is_modifier(word: &str) -> bool {
    ACCESS_MODIFIERS.contains(&word) || OTHER_MODIFIERS.contains(&word)
}

/// Keywords that start a declaration.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "actor",
    "associatedtype",
    "case",
    "class",
    "deinit",
    "enum",
    "extension",
    "func",
    "import",
    "init",
    "let",
    "operator",
    "precedencegroup",
    "protocol",
    "struct",
    "subscript",
    "typealias",
    "var",
];

/// Returns true if `word` starts a declaration.
#[must_use]
pub fn is_declaration_keyword(word: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(TokenKind::Keyword.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::StringHead.category(), TokenCategory::Literal);
        assert_eq!(TokenKind::Comma.category(), TokenCategory::Punctuation);
        assert_eq!(TokenKind::Newline.category(), TokenCategory::Trivia);
        assert!(TokenKind::Unterminated.is_trivia());
    }

    #[test]
    fn modifier_words() {
        assert!(is_modifier("private"));
        assert!(is_modifier("mutating"));
        assert!(!is_modifier("func"));
        assert!(is_declaration_keyword("typealias"));
        assert!(is_keyword("fallthrough"));
        assert!(!is_keyword("open"));
    }
}
