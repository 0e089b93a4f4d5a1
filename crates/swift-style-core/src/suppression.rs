//! Comment-based suppression markers.
//!
//! Supports markers like:
//! ```text
//! // swift-style: allow(case-pattern-binding, SW301) reason="payload is validated"
//! // swift-style: allow
//! ```
//!
//! A marker on a line of its own covers the outermost statement or
//! declaration starting at the next code token. A marker trailing code on
//! the same line covers the innermost statement or declaration containing
//! the code before it. Either way the covered range is the whole lines the
//! statement occupies, so indentation and trailing whitespace are included.

use crate::span::Span;
use crate::syntax::{NodeRef, SyntaxTree};
use crate::token::TokenKind;
use crate::types::Diagnostic;

/// Parsed marker comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Rule names or codes. Empty means every rule.
    pub ids: Vec<String>,
    /// Optional reason for the suppression.
    pub reason: Option<String>,
}

/// A byte range in which the named rules (or all rules) are silenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionSpan {
    /// Covered range.
    pub span: Span,
    /// Rule names or codes. Empty means every rule.
    pub ids: Vec<String>,
    /// Optional reason given in the marker.
    pub reason: Option<String>,
    /// Span of the marker comment itself.
    pub comment: Span,
}

impl SuppressionSpan {
    /// Returns true if the span silences `diagnostic`.
    #[must_use]
    pub fn suppresses(&self, diagnostic: &Diagnostic) -> bool {
        self.span.contains(diagnostic.span()) && self.names(&diagnostic.code, &diagnostic.rule)
    }

    /// Returns true if the id set is empty or contains `code` or `name`.
    #[must_use]
    pub fn names(&self, code: &str, name: &str) -> bool {
        self.ids.is_empty() || self.ids.iter().any(|id| id == code || id == name)
    }
}

/// Parses a marker from the text of a line comment.
///
/// Returns `None` if the comment does not start with `marker`, or if the
/// marker is followed by anything other than an id list and a reason.
#[must_use]
pub fn parse_marker(comment: &str, marker: &str) -> Option<Marker> {
    let body = comment
        .strip_prefix("///")
        .or_else(|| comment.strip_prefix("//"))?
        .trim();
    let rest = body.strip_prefix(marker)?;
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    let mut rest = rest.trim_start();

    let mut ids = Vec::new();
    if let Some(list) = rest.strip_prefix('(') {
        let close = list.find(')')?;
        ids = list[..close]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        rest = list[close + 1..].trim_start();
    }

    let reason = match rest.strip_prefix("reason=") {
        Some(quoted) => {
            let quoted = quoted.trim_start().strip_prefix('"')?;
            let end = quoted.find('"')?;
            Some(quoted[..end].to_string())
        }
        None if rest.is_empty() => None,
        None => return None,
    };

    Some(Marker { ids, reason })
}

/// Collects the suppression spans of every marker comment in `tree`.
#[must_use]
pub fn collect(tree: &SyntaxTree, marker: &str) -> Vec<SuppressionSpan> {
    let tokens = tree.tokens();
    let mut spans = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::LineComment {
            continue;
        }
        let Some(Marker { ids, reason }) = parse_marker(&token.text, marker) else {
            continue;
        };
        let target = if trails_code(tree, index) {
            tree.prev_code_token(index)
                .and_then(|prev| innermost_statement(tree.owner(prev)))
        } else {
            tree.next_code_token(index)
                .and_then(|next| outermost_statement_at(tree, next))
        };
        if let Some(node) = target {
            spans.push(SuppressionSpan {
                span: whole_lines(tree, node),
                ids,
                reason,
                comment: token.span,
            });
        }
    }
    spans
}

/// True when code precedes the comment at `index` on the same line.
fn trails_code(tree: &SyntaxTree, index: usize) -> bool {
    tree.tokens()[..index]
        .iter()
        .rev()
        .take_while(|t| t.kind != TokenKind::Newline)
        .any(|t| !t.is_trivia())
}

/// Widens `node` to the source lines it occupies, from the start of its
/// first line through the line terminator of its last line.
fn whole_lines(tree: &SyntaxTree, node: NodeRef<'_>) -> Span {
    let tokens = tree.tokens();
    let range = node.token_range();
    let start = tokens[..range.start]
        .iter()
        .rev()
        .find(|t| t.kind == TokenKind::Newline)
        .map_or(0, |t| t.span.end);
    let end = tokens[range.end..]
        .iter()
        .find(|t| t.kind == TokenKind::Newline)
        .or_else(|| tokens.last())
        .map_or(node.span().end, |t| t.span.end);
    Span::new(start, end.max(node.span().end))
}

fn innermost_statement(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    std::iter::once(node)
        .chain(node.ancestors())
        .find(|n| n.kind().is_statement_like())
}

fn outermost_statement_at(tree: &SyntaxTree, token: usize) -> Option<NodeRef<'_>> {
    let starts_here = |n: &NodeRef<'_>| n.first_token().is_some_and(|(i, _)| i == token);
    let owner = tree.owner(token);
    std::iter::once(owner)
        .chain(owner.ancestors())
        .take_while(starts_here)
        .filter(|n| n.kind().is_statement_like())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "swift-style: allow";

    #[test]
    fn test_parse_marker_with_ids_and_reason() {
        let marker = parse_marker(
            "// swift-style: allow(force-unwrap, SW101) reason=\"checked above\"",
            MARKER,
        )
        .unwrap();
        assert_eq!(marker.ids, vec!["force-unwrap", "SW101"]);
        assert_eq!(marker.reason.as_deref(), Some("checked above"));
    }

    #[test]
    fn test_parse_marker_without_ids() {
        let marker = parse_marker("// swift-style: allow", MARKER).unwrap();
        assert!(marker.ids.is_empty());
        assert!(marker.reason.is_none());
    }

    #[test]
    fn test_parse_marker_rejects_other_text() {
        assert!(parse_marker("// swift-style: allowance", MARKER).is_none());
        assert!(parse_marker("// swift-style: allow because", MARKER).is_none());
        assert!(parse_marker("// unrelated", MARKER).is_none());
        assert!(parse_marker("// swift-style: allow(SW101", MARKER).is_none());
    }

    #[test]
    fn test_leading_marker_covers_next_statement() {
        let source = "let a = 1\n// swift-style: allow(SW303)\ncase let .b(x) = value\nlet c = 2\n";
        let tree = SyntaxTree::parse(source);
        let spans = collect(&tree, MARKER);
        assert_eq!(spans.len(), 1);
        assert_eq!(&source[spans[0].span.range()], "case let .b(x) = value\n");
        assert_eq!(spans[0].ids, vec!["SW303"]);
    }

    #[test]
    fn test_leading_marker_takes_outermost_statement() {
        let source = "// swift-style: allow\nfoo(a!) { b! }\n";
        let tree = SyntaxTree::parse(source);
        let spans = collect(&tree, MARKER);
        assert_eq!(spans.len(), 1);
        assert_eq!(&source[spans[0].span.range()], "foo(a!) { b! }\n");
    }

    #[test]
    fn test_trailing_marker_covers_enclosing_statement() {
        let source = "func f() {\n  let v = x! // swift-style: allow(force-unwrap)\n  let w = y!\n}\n";
        let tree = SyntaxTree::parse(source);
        let spans = collect(&tree, MARKER);
        assert_eq!(spans.len(), 1);
        assert_eq!(
            &source[spans[0].span.range()],
            "  let v = x! // swift-style: allow(force-unwrap)\n"
        );
    }

    #[test]
    fn test_span_reaches_indentation_and_line_end() {
        let source = "func f() {\n  // swift-style: allow\n\tlet a = [\n\t\t1,   \n\t]  \n}\n";
        let tree = SyntaxTree::parse(source);
        let spans = collect(&tree, MARKER);
        assert_eq!(spans.len(), 1);
        assert_eq!(
            &source[spans[0].span.range()],
            "\tlet a = [\n\t\t1,   \n\t]  \n"
        );
    }

    #[test]
    fn test_span_without_final_newline_ends_at_eof() {
        let source = "\tlet a = 1 // swift-style: allow(SW102)";
        let tree = SyntaxTree::parse(source);
        let spans = collect(&tree, MARKER);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, Span::new(0, source.len()));
    }

    #[test]
    fn test_marker_before_closing_brace_covers_nothing() {
        let source = "func f() {\n  g()\n  // swift-style: allow\n}\n";
        let tree = SyntaxTree::parse(source);
        assert!(collect(&tree, MARKER).is_empty());
    }
}
