//! Rule to forbid force unwrapping (`value!`) in production code.
//!
//! # Rationale
//!
//! A force unwrap traps at runtime when the optional is `nil`. Prefer
//! `if let`, `guard let` or `??`.
//!
//! # Configuration
//!
//! - `allow_in_tests`: Allow in test files and `test*` functions (default: true)
//!
//! # Exemptions
//!
//! A comment on the same line or the line above is taken as the
//! justification for the unwrap:
//!
//! ```text
//! // The asset ships with the app bundle.
//! let url = Bundle.main.url(forResource: "config", withExtension: "json")!
//! ```

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, Violation,
};

/// Rule code for force-unwrap.
pub const CODE: &str = "SW301";

/// Rule name for force-unwrap.
pub const NAME: &str = "force-unwrap";

/// Forbids `!` force unwraps outside test code.
#[derive(Debug, Clone)]
pub struct ForceUnwrap {
    /// Allow in test code.
    pub allow_in_tests: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ForceUnwrap {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceUnwrap {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allow_in_tests: true,
            severity: Severity::Warning,
        }
    }

    /// Sets whether to allow in test code.
    #[must_use]
    pub fn allow_in_tests(mut self, allow: bool) -> Self {
        self.allow_in_tests = allow;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ForceUnwrap {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids force unwrapping outside tests unless a comment justifies it"
    }

    fn category(&self) -> Category {
        Category::Optionals
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::ForceUnwrapExpr]
    }

    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        if self.allow_in_tests && ctx.in_test_code(node) {
            return Vec::new();
        }
        let Some((_, bang)) = node.last_token() else {
            return Vec::new();
        };
        let line = bang.line as usize;
        if ctx.line_has_comment(line) || (line > 1 && ctx.line_has_comment(line - 1)) {
            return Vec::new();
        }

        let operand = node
            .child(0)
            .map(|n| n.text())
            .unwrap_or_default();
        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            node.span(),
            format!("Force unwrap of `{operand}`"),
        )
        .with_suggestion(Suggestion::new(
            "Use `if let`, `guard let` or `??`, or add a comment explaining why this cannot be nil",
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::run_rule;

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&ForceUnwrap::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_detects_force_unwrap() {
        let violations = check_code("let n = Int(text)!\nlet c = view!.frame\n");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].message, "Force unwrap of `Int(text)`");
        assert!(violations[0].edit().is_none());
    }

    #[test]
    fn test_ignores_non_unwrap_bangs() {
        assert!(check_code("let a = !flag\nlet b = x != y\nlet c = try! load()\nlet d = e as! Int\n").is_empty());
    }

    #[test]
    fn test_comment_justifies() {
        assert!(check_code("// bundled resource\nlet u = url!\n").is_empty());
        assert!(check_code("let u = url! // bundled resource\n").is_empty());
    }

    #[test]
    fn test_allows_in_tests() {
        let code = "func testLoad() {\n  let v = value!\n}\n";
        assert!(check_code(code).is_empty());
        let in_test_file = run_rule(&ForceUnwrap::new(), "Tests/AppTests/LoadTests.swift", "let v = value!\n");
        assert!(in_test_file.is_empty());
        let strict = run_rule(
            &ForceUnwrap::new().allow_in_tests(false),
            "Tests/AppTests/LoadTests.swift",
            "let v = value!\n",
        );
        assert_eq!(strict.len(), 1);
    }
}
