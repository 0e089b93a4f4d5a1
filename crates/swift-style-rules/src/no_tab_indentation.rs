//! Rule to forbid tab characters in indentation.
//!
//! # Fix
//!
//! Each leading tab becomes `indent_width` spaces (`[lint].indent_width`,
//! default 2). Tabs inside string literals are never touched.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, TokenKind,
    Violation,
};

/// Rule code for no-tab-indentation.
pub const CODE: &str = "SW102";

/// Rule name for no-tab-indentation.
pub const NAME: &str = "no-tab-indentation";

/// Forbids tabs in leading whitespace.
#[derive(Debug, Clone)]
pub struct NoTabIndentation {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoTabIndentation {
    fn default() -> Self {
        Self::new()
    }
}

impl NoTabIndentation {
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

impl Rule for NoTabIndentation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Indents with spaces instead of tabs"
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
        let spaces = " ".repeat(ctx.indent_width);
        tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                t.kind == TokenKind::Whitespace
                    && t.text.contains('\t')
                    && (*i == 0 || tokens[i - 1].kind == TokenKind::Newline)
            })
            .map(|(_, t)| {
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    t.span,
                    "Tab used for indentation",
                )
                .with_suggestion(Suggestion::with_fix(
                    format!("Indent with {} spaces per level", ctx.indent_width),
                    TextEdit::new(t.span, t.text.replace('\t', &spaces)),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&NoTabIndentation::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_replaces_leading_tabs() {
        let code = "func f() {\n\tif ok {\n\t\tg()\n\t}\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 3);
        assert_eq!(
            fixed(code, &violations),
            "func f() {\n  if ok {\n    g()\n  }\n}\n"
        );
    }

    #[test]
    fn test_mixed_indentation() {
        let code = "  \tlet a = 1\n";
        let violations = check_code(code);
        assert_eq!(fixed(code, &violations), "    let a = 1\n");
    }

    #[test]
    fn test_ignores_inner_tabs_and_strings() {
        assert!(check_code("let a =\t1\n").is_empty());
        assert!(check_code("let s = \"\"\"\n\tindented\n\t\"\"\"\n").is_empty());
    }
}
