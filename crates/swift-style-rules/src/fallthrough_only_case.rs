//! Rule against arms whose only statement is `fallthrough`.
//!
//! ```text
//! case .a:
//!   fallthrough     // flagged
//! case .b:
//!   handle()
//! ```
//!
//! Listing the patterns together (`case .a, .b:`) says the same thing.

use crate::empty_case_body::case_body;
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, Violation,
};

/// Rule code for fallthrough-only-case.
pub const CODE: &str = "SW402";

/// Rule name for fallthrough-only-case.
pub const NAME: &str = "fallthrough-only-case";

/// Flags arms that only fall through.
#[derive(Debug, Clone)]
pub struct FallthroughOnlyCase {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for FallthroughOnlyCase {
    fn default() -> Self {
        Self::new()
    }
}

impl FallthroughOnlyCase {
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

impl Rule for FallthroughOnlyCase {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Combines patterns instead of an arm that only falls through"
    }

    fn category(&self) -> Category {
        Category::ControlFlow
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::SwitchCase]
    }

    fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut body = case_body(node);
        let (Some(only), None) = (body.next(), body.next()) else {
            return Vec::new();
        };
        if only.kind() != NodeKind::ControlTransferStmt || !only.has_keyword("fallthrough") {
            return Vec::new();
        }
        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            node.span(),
            "Arm only falls through to the next one",
        )
        .with_suggestion(Suggestion::new(
            "Combine the patterns into one arm: `case a, b:`",
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::run_rule;

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&FallthroughOnlyCase::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_detects_fallthrough_only_arm() {
        let code = "switch x {\ncase .a:\n  fallthrough\ncase .b:\n  run()\ndefault:\n  break\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert!(code[violations[0].span.range()].starts_with("case .a:"));
    }

    #[test]
    fn test_accepts_work_before_fallthrough() {
        let code = "switch x {\ncase .a:\n  log()\n  fallthrough\ncase .b:\n  run()\ndefault:\n  break\n}\n";
        assert!(check_code(code).is_empty());
    }
}
