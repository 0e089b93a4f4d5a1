//! Rule to forbid whitespace at the end of a line.
//!
//! Covers whitespace before a line break or the end of the file, including
//! trailing blanks inside `//` comments. Lines inside multi-line string
//! literals are left alone since their whitespace is content.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Span, Suggestion, TextEdit,
    TokenKind, Violation,
};

/// Rule code for trailing-whitespace.
pub const CODE: &str = "SW105";

/// Rule name for trailing-whitespace.
pub const NAME: &str = "trailing-whitespace";

/// Forbids whitespace at the end of lines.
#[derive(Debug, Clone)]
pub struct TrailingWhitespace {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for TrailingWhitespace {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailingWhitespace {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Info,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for TrailingWhitespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids whitespace at the end of a line"
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
            let at_line_end = tokens
                .get(index + 1)
                .map_or(true, |next| next.kind == TokenKind::Newline);
            if !at_line_end {
                continue;
            }
            let span = match token.kind {
                TokenKind::Whitespace => token.span,
                TokenKind::LineComment => {
                    let trimmed = token.text.trim_end().len();
                    if trimmed == token.text.len() {
                        continue;
                    }
                    Span::new(token.span.start + trimmed, token.span.end)
                }
                _ => continue,
            };
            violations.push(
                Violation::new(CODE, NAME, self.severity, span, "Trailing whitespace")
                    .with_suggestion(Suggestion::with_fix(
                        "Remove the trailing whitespace",
                        TextEdit::delete(span),
                    )),
            );
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&TrailingWhitespace::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_detects_trailing_whitespace() {
        let code = "let a = 1  \n  \nlet b = 2\t\n// note  \nlet c = 3 ";
        let violations = check_code(code);
        assert_eq!(violations.len(), 5);
        assert_eq!(violations[0].severity, Severity::Info);
        assert_eq!(
            fixed(code, &violations),
            "let a = 1\n\nlet b = 2\n// note\nlet c = 3"
        );
    }

    #[test]
    fn test_ignores_multiline_string_content() {
        let code = "let s = \"\"\"\n  keep  \n  \"\"\"\n";
        assert!(check_code(code).is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let code = "let a = 1 \r\nlet b = 2\r\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert_eq!(fixed(code, &violations), "let a = 1\r\nlet b = 2\r\n");
    }
}
