//! Rule preferring trailing closure syntax.
//!
//! # Rationale
//!
//! When a call's only closure argument is also its last, the closure is
//! written after the parentheses:
//!
//! ```text
//! items.forEach({ print($0) })   // flagged
//! items.forEach { print($0) }    // preferred
//! ```
//!
//! # Fix
//!
//! Applied only when the closure argument is unlabeled; dropping a label
//! can change which overload is called.
//!
//! Calls in `if`/`guard`/`while` conditions, `switch` subjects and
//! `for ... in` sequences are skipped: a trailing closure does not parse
//! there.

use crate::utils::has_comment;
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Span, Suggestion, TextEdit,
    Violation,
};

/// Rule code for trailing-closure.
pub const CODE: &str = "SW201";

/// Rule name for trailing-closure.
pub const NAME: &str = "trailing-closure";

/// Prefers trailing closure syntax for a sole, final closure argument.
#[derive(Debug, Clone)]
pub struct TrailingClosure {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for TrailingClosure {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailingClosure {
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

impl Rule for TrailingClosure {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Uses trailing closure syntax for a sole final closure argument"
    }

    fn category(&self) -> Category {
        Category::Closures
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn fixable(&self) -> bool {
        true
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::CallExpr]
    }

    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        // callee, argument list and nothing after it
        if node.children().len() != 2 {
            return Vec::new();
        }
        let Some(args) = node.child(1).filter(|n| n.kind() == NodeKind::ArgumentList) else {
            return Vec::new();
        };
        let closures = args.children().filter(|a| closure_of(*a).is_some()).count();
        let Some(last) = args.children().last() else {
            return Vec::new();
        };
        let Some(closure) = closure_of(last) else {
            return Vec::new();
        };
        if closures != 1 || in_condition(node) {
            return Vec::new();
        }

        let labeled = last.direct_tokens().next().is_some();
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            last.span(),
            "Closure passed as the last argument should use trailing closure syntax",
        );
        if labeled {
            return vec![violation.with_suggestion(Suggestion::new(
                "Move the closure after the parentheses and drop its label if the API allows",
            ))];
        }

        let body = &ctx.source[closure.span().range()];
        let previous = last.prev_sibling();
        let (span, replacement) = match previous {
            None => (args.span(), format!(" {body}")),
            Some(prev) => (
                Span::new(prev.span().end, args.span().end),
                format!(") {body}"),
            ),
        };
        if has_comment(ctx.tree.tokens(), span) {
            return vec![violation];
        }
        vec![violation.with_suggestion(Suggestion::with_fix(
            "Use trailing closure syntax",
            TextEdit::new(span, replacement),
        ))]
    }
}

/// The closure an argument consists of, if it is nothing else.
fn closure_of(argument: NodeRef<'_>) -> Option<NodeRef<'_>> {
    if argument.kind() != NodeKind::Argument || argument.children().len() != 1 {
        return None;
    }
    argument.child(0).filter(|c| c.kind() == NodeKind::ClosureExpr)
}

/// Returns true if `call` sits in a position where a trailing closure would
/// not parse, without brackets in between.
fn in_condition(call: NodeRef<'_>) -> bool {
    for ancestor in call.ancestors() {
        match ancestor.kind() {
            NodeKind::ArgumentList
            | NodeKind::TupleExpr
            | NodeKind::CollectionExpr
            | NodeKind::ClosureExpr
            | NodeKind::CodeBlock
            | NodeKind::SwitchCase
            | NodeKind::SourceFile => return false,
            NodeKind::ConditionList
            | NodeKind::SwitchStmt
            | NodeKind::ForInStmt
            | NodeKind::RepeatWhileStmt
            | NodeKind::CaseCondition
            | NodeKind::CatchClause => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&TrailingClosure::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_rewrites_sole_argument() {
        let code = "items.forEach({ print($0) })\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert_eq!(fixed(code, &violations), "items.forEach { print($0) }\n");
    }

    #[test]
    fn test_rewrites_final_argument() {
        let code = "UIView.animate(withDuration: 0.3, { view.alpha = 0 })\n";
        let violations = check_code(code);
        assert_eq!(
            fixed(code, &violations),
            "UIView.animate(withDuration: 0.3) { view.alpha = 0 }\n"
        );
    }

    #[test]
    fn test_labeled_closure_has_no_fix() {
        let violations = check_code("load(completion: { result in handle(result) })\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].edit().is_none());
    }

    #[test]
    fn test_ignores_already_trailing_and_multiple_closures() {
        assert!(check_code("items.forEach { print($0) }\n").is_empty());
        assert!(check_code("f({ a }, { b })\n").is_empty());
        assert!(check_code("f({ a }, 1)\n").is_empty());
    }

    #[test]
    fn test_ignores_conditions() {
        assert!(check_code("if items.contains(where: { $0 > 1 }) { go() }\n").is_empty());
        assert!(check_code("for x in items.filter({ $0 > 1 }) { go(x) }\n").is_empty());
    }

    #[test]
    fn test_flags_inside_condition_brackets_and_bodies() {
        let code = "if ok {\n  items.forEach({ go($0) })\n}\n";
        assert_eq!(check_code(code).len(), 1);
    }
}
