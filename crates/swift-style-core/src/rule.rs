//! Rule trait for defining lint rules.

use crate::context::RuleContext;
use crate::syntax::{NodeKind, NodeRef};
use crate::types::{Category, Severity, Violation};

/// A style rule evaluated over syntax nodes.
///
/// A rule subscribes to the node kinds it inspects; the engine calls
/// [`Rule::check`] once per subscribed node during a single pre-order
/// traversal. Rules are pure: they read the node, its surroundings through
/// [`NodeRef`] and the [`RuleContext`], and return violations. A fix travels
/// inside the violation's suggestion as a [`crate::TextEdit`].
///
/// # Example
///
/// ```
/// use swift_style_core::{
///     Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Violation,
/// };
///
/// pub struct NoPrint;
///
/// impl Rule for NoPrint {
///     fn name(&self) -> &'static str { "no-print" }
///     fn code(&self) -> &'static str { "X001" }
///     fn category(&self) -> Category { Category::Layout }
///     fn node_kinds(&self) -> &'static [NodeKind] { &[NodeKind::CallExpr] }
///
///     fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
///         let callee = node.child(0).map(|c| c.text()).unwrap_or_default();
///         if callee != "print" {
///             return Vec::new();
///         }
///         vec![Violation::new(
///             self.code(),
///             self.name(),
///             self.default_severity(),
///             node.span(),
///             "print() left in code",
///         )]
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "force-unwrap").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "SW301").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the category this rule belongs to.
    fn category(&self) -> Category;

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Whether violations of this rule can carry an automatic edit.
    fn fixable(&self) -> bool {
        false
    }

    /// Node kinds this rule is dispatched on.
    fn node_kinds(&self) -> &'static [NodeKind];

    /// Checks one node and returns any violations found.
    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::LineIndex;
    use crate::syntax::SyntaxTree;
    use std::path::Path;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }
        fn category(&self) -> Category {
            Category::Layout
        }
        fn node_kinds(&self) -> &'static [NodeKind] {
            &[NodeKind::ReturnStmt]
        }

        fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
            vec![Violation::new(
                self.code(),
                self.name(),
                self.default_severity(),
                node.span(),
                "Test violation",
            )]
        }
    }

    #[test]
    fn test_rule_trait() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Warning);
        assert!(!rule.fixable());

        let source = "func f() { return }";
        let tree = SyntaxTree::parse(source);
        let index = LineIndex::new(source);
        let ctx = RuleContext::new(Path::new("a.swift"), source, &tree, &index);
        let node = tree
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::ReturnStmt)
            .unwrap();
        let violations = rule.check(node, &ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].span, node.span());
    }
}
