//! Rule for spacing around `,`, `:` and `;`.
//!
//! No whitespace goes before a comma, colon or semicolon; exactly one space
//! follows a comma or colon unless a line break does.
//!
//! Exempt: ternary colons (`a ? b : c`), attribute arguments
//! (`@available(iOS 13, *)`), `#selector(...)` and other pound expressions,
//! compiler directives, and the empty dictionary literal `[:]`.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Span, Suggestion, TextEdit,
    TokenKind, Violation,
};

/// Rule code for punctuation-spacing.
pub const CODE: &str = "SW104";

/// Rule name for punctuation-spacing.
pub const NAME: &str = "punctuation-spacing";

/// Checks whitespace around commas, colons and semicolons.
#[derive(Debug, Clone)]
pub struct PunctuationSpacing {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for PunctuationSpacing {
    fn default() -> Self {
        Self::new()
    }
}

impl PunctuationSpacing {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn violation(&self, span: Span, message: String, fix: &str, edit: TextEdit) -> Violation {
        Violation::new(CODE, NAME, self.severity, span, message)
            .with_suggestion(Suggestion::with_fix(fix, edit))
    }
}

impl Rule for PunctuationSpacing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "No space before , : ; and one space after , :"
    }

    fn category(&self) -> Category {
        Category::Layout
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn fixable(&self) -> bool {
        true
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::SourceFile]
    }

    fn check(&self, _node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let tokens = ctx.tree.tokens();
        let mut violations = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            let mark = match token.kind {
                TokenKind::Comma => ',',
                TokenKind::Colon => ':',
                TokenKind::Semicolon => ';',
                _ => continue,
            };
            if exempt(ctx, index) {
                continue;
            }

            // Whitespace before, unless the mark starts its line.
            if let Some(prev) = index.checked_sub(1).map(|i| &tokens[i]) {
                let line_start = index < 2 || tokens[index - 2].kind == TokenKind::Newline;
                if prev.kind == TokenKind::Whitespace && !line_start {
                    violations.push(self.violation(
                        prev.span,
                        format!("Whitespace before `{mark}`"),
                        "Remove the whitespace",
                        TextEdit::delete(prev.span),
                    ));
                }
            }

            if mark == ';' {
                continue;
            }
            let Some(next) = tokens.get(index + 1) else {
                continue;
            };
            match next.kind {
                TokenKind::Newline | TokenKind::LineComment | TokenKind::BlockComment => {}
                k if k.is_close_delimiter() => {}
                TokenKind::Whitespace => {
                    let followed_by_code = tokens
                        .get(index + 2)
                        .is_some_and(|t| !t.is_trivia());
                    if next.text != " " && followed_by_code {
                        violations.push(self.violation(
                            next.span,
                            format!("Expected one space after `{mark}`"),
                            "Use a single space",
                            TextEdit::new(next.span, " "),
                        ));
                    }
                }
                _ => {
                    violations.push(self.violation(
                        token.span,
                        format!("Missing space after `{mark}`"),
                        "Insert a space",
                        TextEdit::insert(token.span.end, " "),
                    ));
                }
            }
        }
        violations
    }
}

fn exempt(ctx: &RuleContext<'_>, index: usize) -> bool {
    let owner = ctx.tree.owner(index);
    let exempt_owner = |n: NodeRef<'_>| {
        matches!(
            n.kind(),
            NodeKind::Attribute
                | NodeKind::PoundExpr
                | NodeKind::CompilerDirective
                | NodeKind::Error
        )
    };
    if exempt_owner(owner) || owner.ancestors().any(exempt_owner) {
        return true;
    }
    let token = &ctx.tree.tokens()[index];
    token.kind == TokenKind::Colon
        && (owner.kind() == NodeKind::SequenceExpr
            || (owner.kind() == NodeKind::CollectionExpr && owner.children().next().is_none()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&PunctuationSpacing::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_accepts_conventional_spacing() {
        let code = "let point: (x: Int, y: Int) = (x: 1, y: 2)\nlet d: [String: Int] = [:]\nlet m = a ? b : c\n";
        assert!(check_code(code).is_empty());
    }

    #[test]
    fn test_space_before() {
        let code = "f(a , b)\nlet x : Int = 1\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 2);
        assert_eq!(fixed(code, &violations), "f(a, b)\nlet x: Int = 1\n");
    }

    #[test]
    fn test_space_after() {
        let code = "f(a,b)\nlet x:Int = 1\nlet y = [1,  2]\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 3);
        assert_eq!(
            fixed(code, &violations),
            "f(a, b)\nlet x: Int = 1\nlet y = [1, 2]\n"
        );
    }

    #[test]
    fn test_exemptions() {
        assert!(check_code("@available(iOS 13,*)\nfunc f() {}\n").is_empty());
        assert!(check_code("let s = #selector(foo(_:bar:))\n").is_empty());
        assert!(check_code("let m = a ? b :c\n").is_empty());
        assert!(check_code("let xs = [\n  1,\n  2,\n]\n").is_empty());
    }

    #[test]
    fn test_leading_comma_line_is_not_flagged() {
        assert!(check_code("f(a\n  , b)\n").is_empty());
    }
}
