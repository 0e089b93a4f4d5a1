//! Helpers shared by several rules.

use swift_style_core::{NodeKind, NodeRef, Span, Token, TokenKind};

/// Whether a declared name follows type or value casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Types, type aliases and generic parameters.
    Type,
    /// Functions, variables, parameters and enum elements.
    Value,
}

/// Node kinds that introduce a name.
pub const NAMED_DECLARATIONS: &[NodeKind] = &[
    NodeKind::TypeDecl,
    NodeKind::TypeAliasDecl,
    NodeKind::GenericParameter,
    NodeKind::FunctionDecl,
    NodeKind::PatternBinding,
    NodeKind::EnumCaseElement,
    NodeKind::Parameter,
];

/// Casing convention of the name a node declares.
#[must_use]
pub fn name_kind(kind: NodeKind) -> NameKind {
    match kind {
        NodeKind::TypeDecl | NodeKind::TypeAliasDecl | NodeKind::GenericParameter => {
            NameKind::Type
        }
        _ => NameKind::Value,
    }
}

/// The token naming a declaration, with its index.
///
/// For functions that is the identifier after `func`; for types the one
/// after the type keyword; for variables and enum elements the leading
/// identifier; for parameters the internal name. Extensions, operators,
/// `init` and tuple patterns have no name.
#[must_use]
pub fn declared_name(node: NodeRef<'_>) -> Option<(usize, &Token)> {
    let mut tokens = node.direct_tokens();
    match node.kind() {
        NodeKind::TypeDecl | NodeKind::TypeAliasDecl => {
            tokens
                .find(|(_, t)| t.kind == TokenKind::Keyword)
                .filter(|(_, t)| !t.is_keyword("extension"))?;
            tokens.next().filter(|(_, t)| t.kind == TokenKind::Identifier)
        }
        NodeKind::Parameter => tokens
            .take_while(|(_, t)| t.kind != TokenKind::Colon)
            .last()
            .filter(|(_, t)| t.kind == TokenKind::Identifier),
        NodeKind::FunctionDecl => {
            tokens.find(|(_, t)| t.is_keyword("func"))?;
            tokens.next().filter(|(_, t)| t.kind == TokenKind::Identifier)
        }
        NodeKind::PatternBinding | NodeKind::EnumCaseElement | NodeKind::GenericParameter => {
            tokens.next().filter(|(_, t)| t.kind == TokenKind::Identifier)
        }
        _ => None,
    }
}

/// Strips the backticks of an escaped identifier.
#[must_use]
pub fn unescaped(name: &str) -> &str {
    name.strip_prefix('`')
        .and_then(|n| n.strip_suffix('`'))
        .unwrap_or(name)
}

/// Splits an identifier into camel-case words as `(byte offset, word)`.
///
/// `URLSession` yields `URL`, `Session`; `userId2` yields `user`, `Id`, `2`.
/// Underscores separate words and are not part of any.
#[must_use]
pub fn camel_words(name: &str) -> Vec<(usize, &str)> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    for (i, &(offset, c)) in chars.iter().enumerate() {
        if c == '_' {
            if let Some(s) = start.take() {
                words.push((s, &name[s..offset]));
            }
            continue;
        }
        let prev = i.checked_sub(1).map(|p| chars[p].1);
        let next = chars.get(i + 1).map(|&(_, n)| n);
        let boundary = match prev {
            None | Some('_') => false,
            Some(p) => {
                (c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()))
                    || (c.is_uppercase() && p.is_uppercase() && next.is_some_and(char::is_lowercase))
                    || (c.is_ascii_digit() && !p.is_ascii_digit())
                    || (!c.is_ascii_digit() && p.is_ascii_digit())
            }
        };
        match start {
            Some(s) if boundary => {
                words.push((s, &name[s..offset]));
                start = Some(offset);
            }
            None => start = Some(offset),
            Some(_) => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &name[s..]));
    }
    words
}

/// Span between the end of token `before` and the start of token `after`,
/// if the tokens between them are whitespace and line breaks only.
#[must_use]
pub fn whitespace_gap(tokens: &[Token], before: usize, after: usize) -> Option<Span> {
    let gap = tokens.get(before + 1..after)?;
    gap.iter()
        .all(|t| matches!(t.kind, TokenKind::Whitespace | TokenKind::Newline))
        .then(|| Span::new(tokens[before].span.end, tokens[after].span.start))
}

/// Returns true if any token covered by `span` is a comment.
#[must_use]
pub fn has_comment(tokens: &[Token], span: Span) -> bool {
    tokens
        .iter()
        .any(|t| t.kind.is_comment() && span.contains(t.span))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use swift_style_core::{apply_edits, LineIndex, Rule, RuleContext, SyntaxTree, Violation};

    /// Runs one rule over every subscribed node of `source`.
    pub fn run_rule(rule: &dyn Rule, path: &str, source: &str) -> Vec<Violation> {
        let tree = SyntaxTree::parse(source);
        let index = LineIndex::new(source);
        let ctx = RuleContext::new(Path::new(path), source, &tree, &index);
        let root = tree.root();
        std::iter::once(root)
            .chain(root.descendants())
            .filter(|n| rule.node_kinds().contains(&n.kind()))
            .flat_map(|n| rule.check(n, &ctx))
            .collect()
    }

    /// Applies the edits of `violations` to `source`.
    pub fn fixed(source: &str, violations: &[Violation]) -> String {
        apply_edits(
            source,
            violations
                .iter()
                .filter_map(|v| v.edit().map(|e| (v.code.as_str(), e))),
        )
        .output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(name: &str) -> Vec<&str> {
        camel_words(name).into_iter().map(|(_, w)| w).collect()
    }

    #[test]
    fn test_camel_words() {
        assert_eq!(words("URLSession"), vec!["URL", "Session"]);
        assert_eq!(words("userId2"), vec!["user", "Id", "2"]);
        assert_eq!(words("max_count"), vec!["max", "count"]);
        assert_eq!(words("_private"), vec!["private"]);
        assert_eq!(words("HTTPURLResponse"), vec!["HTTPURL", "Response"]);
        assert_eq!(words("x"), vec!["x"]);
    }

    #[test]
    fn test_declared_name() {
        let tree = swift_style_core::SyntaxTree::parse(
            "public final class Foo {}\nextension Foo {}\nfunc bar(_ qux: Int) {}\nlet baz = 1\n",
        );
        let names: Vec<String> = tree
            .root()
            .descendants()
            .filter_map(|n| declared_name(n).map(|(_, t)| t.text.clone()))
            .collect();
        assert_eq!(names, vec!["Foo", "bar", "qux", "baz"]);
    }

    #[test]
    fn test_unescaped() {
        assert_eq!(unescaped("`default`"), "default");
        assert_eq!(unescaped("plain"), "plain");
    }
}
