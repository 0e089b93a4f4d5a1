//! Rule to forbid implicitly unwrapped optional types (`String!`).
//!
//! # Configuration
//!
//! - `allow_in_tests`: Allow in test code (default: true)
//!
//! Declarations marked `@IBOutlet` are always exempt.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TokenKind, Violation,
};

/// Rule code for implicitly-unwrapped-optional.
pub const CODE: &str = "SW302";

/// Rule name for implicitly-unwrapped-optional.
pub const NAME: &str = "implicitly-unwrapped-optional";

/// Forbids `T!` type annotations.
#[derive(Debug, Clone)]
pub struct ImplicitlyUnwrappedOptional {
    /// Allow in test code.
    pub allow_in_tests: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ImplicitlyUnwrappedOptional {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplicitlyUnwrappedOptional {
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

impl Rule for ImplicitlyUnwrappedOptional {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids implicitly unwrapped optional types outside @IBOutlet and tests"
    }

    fn category(&self) -> Category {
        Category::Optionals
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Type]
    }

    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let ends_with_bang = node.direct_tokens().last().is_some_and(|(_, t)| {
            t.kind == TokenKind::PostfixBang || (t.kind == TokenKind::Operator && t.text == "!")
        });
        if !ends_with_bang {
            return Vec::new();
        }
        if self.allow_in_tests && ctx.in_test_code(node) {
            return Vec::new();
        }
        let outlet = ctx.enclosing_declaration(node).is_some_and(|decl| {
            decl.children()
                .filter(|c| c.kind() == NodeKind::Attribute)
                .any(|a| a.first_token().is_some_and(|(_, t)| t.text == "@IBOutlet"))
        });
        if outlet {
            return Vec::new();
        }

        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            node.span(),
            format!("Implicitly unwrapped optional type `{}`", node.text()),
        )
        .with_suggestion(Suggestion::new(
            "Use a regular optional (`T?`) or a non-optional with an initial value",
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::run_rule;

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&ImplicitlyUnwrappedOptional::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_detects_iuo() {
        let violations = check_code("var name: String!\nfunc f(x: Int!) -> Int! { x }\n");
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].message, "Implicitly unwrapped optional type `String!`");
    }

    #[test]
    fn test_ignores_optionals_and_casts() {
        assert!(check_code("var name: String?\nlet n = x as! Int\n").is_empty());
    }

    #[test]
    fn test_outlets_are_exempt() {
        assert!(check_code("class VC {\n  @IBOutlet weak var label: UILabel!\n}\n").is_empty());
    }

    #[test]
    fn test_test_files_are_exempt() {
        let code = "import XCTest\nvar sut: Service!\n";
        assert!(check_code(code).is_empty());
    }
}
