//! Rule to forbid semicolons as statement terminators or separators.
//!
//! # Fix
//!
//! - `a;` at the end of a line (or before `}`): the semicolon is deleted.
//! - `a; b`: the semicolon and the following blanks become a line break
//!   indented like the current line.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Span, Suggestion, TextEdit,
    TokenKind, Violation,
};

/// Rule code for no-semicolons.
pub const CODE: &str = "SW106";

/// Rule name for no-semicolons.
pub const NAME: &str = "no-semicolons";

/// Forbids `;`.
#[derive(Debug, Clone)]
pub struct NoSemicolons {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoSemicolons {
    fn default() -> Self {
        Self::new()
    }
}

impl NoSemicolons {
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
}

impl Rule for NoSemicolons {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids semicolons"
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
        let tree = ctx.tree;
        let tokens = tree.tokens();
        let mut violations = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Semicolon || tree.owner(index).kind() == NodeKind::Error {
                continue;
            }

            let mut after = index + 1;
            while tokens.get(after).is_some_and(|t| t.kind == TokenKind::Whitespace) {
                after += 1;
            }
            let terminates = match tokens.get(after) {
                None => true,
                Some(next) => {
                    next.kind == TokenKind::Newline
                        || next.kind.is_comment()
                        || next.kind == TokenKind::RBrace
                        || next.kind == TokenKind::Semicolon
                }
            };

            let violation = if terminates {
                Violation::new(CODE, NAME, self.severity, token.span, "Unnecessary semicolon")
                    .with_suggestion(Suggestion::with_fix(
                        "Remove the semicolon",
                        TextEdit::delete(token.span),
                    ))
            } else {
                let indent: String = ctx
                    .line_text(token.line as usize)
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                let end = tokens[after].span.start;
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    token.span,
                    "Semicolon separating statements",
                )
                .with_suggestion(Suggestion::with_fix(
                    "Put each statement on its own line",
                    TextEdit::new(Span::new(token.span.start, end), format!("\n{indent}")),
                ))
            };
            violations.push(violation);
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&NoSemicolons::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_removes_trailing_semicolons() {
        let code = "let a = 1;\nfunc f() { g(); }\nlet b = 2; // done\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 3);
        assert_eq!(
            fixed(code, &violations),
            "let a = 1\nfunc f() { g() }\nlet b = 2 // done\n"
        );
    }

    #[test]
    fn test_splits_statements() {
        let code = "func f() {\n  let a = 1; let b = 2\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "Semicolon separating statements");
        assert_eq!(
            fixed(code, &violations),
            "func f() {\n  let a = 1\n  let b = 2\n}\n"
        );
    }

    #[test]
    fn test_ignores_semicolons_in_strings() {
        assert!(check_code("let s = \"a; b\"\n").is_empty());
    }
}
