//! Rule against parentheses around control-flow conditions.
//!
//! # Rationale
//!
//! `if`, `guard`, `while`, `repeat-while` and `switch` take their
//! condition or subject without parentheses. Wrapping them adds noise
//! carried over from C-family languages.
//!
//! # Fix
//!
//! The parentheses are removed. A space is inserted where the condition
//! would otherwise touch the keyword or the opening brace.
//!
//! Conditions containing a closure are left alone: inside a condition a
//! trailing closure only parses when parenthesised.

use crate::utils::has_comment;
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, TokenKind,
    Violation,
};

/// Rule code for redundant-parentheses.
pub const CODE: &str = "SW101";

/// Rule name for redundant-parentheses.
pub const NAME: &str = "redundant-parentheses";

/// Flags parenthesised conditions of control-flow statements.
#[derive(Debug, Clone)]
pub struct RedundantParentheses {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for RedundantParentheses {
    fn default() -> Self {
        Self::new()
    }
}

impl RedundantParentheses {
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

impl Rule for RedundantParentheses {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids parentheses around if/guard/while/switch conditions"
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
        &[
            NodeKind::IfStmt,
            NodeKind::GuardStmt,
            NodeKind::WhileStmt,
            NodeKind::RepeatWhileStmt,
            NodeKind::SwitchStmt,
        ]
    }

    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let Some(tuple) = condition(node) else {
            return Vec::new();
        };
        let Some(inner) = sole_unlabeled_element(tuple) else {
            return Vec::new();
        };
        if std::iter::once(inner)
            .chain(inner.descendants())
            .any(|n| n.kind() == NodeKind::ClosureExpr)
        {
            return Vec::new();
        }

        let message = if node.kind() == NodeKind::SwitchStmt {
            "Redundant parentheses around `switch` subject".to_string()
        } else {
            let keyword = node
                .direct_tokens()
                .find(|(_, t)| t.kind == TokenKind::Keyword && t.text != "repeat")
                .map_or("if", |(_, t)| t.text.as_str());
            format!("Redundant parentheses around `{keyword}` condition")
        };

        let span = tuple.span();
        let mut violation = Violation::new(CODE, NAME, self.severity, span, message);
        let suggestion = if has_comment(ctx.tree.tokens(), span) {
            Suggestion::new("Remove the parentheses")
        } else {
            let bytes = ctx.source.as_bytes();
            let glued_before = span
                .start
                .checked_sub(1)
                .is_some_and(|i| !bytes[i].is_ascii_whitespace());
            let glued_after = bytes.get(span.end).is_some_and(|b| !b.is_ascii_whitespace());
            let mut replacement = String::new();
            if glued_before {
                replacement.push(' ');
            }
            replacement.push_str(&ctx.source[inner.span().range()]);
            if glued_after {
                replacement.push(' ');
            }
            Suggestion::with_fix("Remove the parentheses", TextEdit::new(span, replacement))
        };
        violation = violation.with_suggestion(suggestion);
        vec![violation]
    }
}

/// The parenthesised condition or subject of a control-flow statement.
fn condition(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let candidate = match node.kind() {
        NodeKind::IfStmt | NodeKind::GuardStmt | NodeKind::WhileStmt => {
            let list = node.find_child(NodeKind::ConditionList)?;
            if list.children().len() != 1 {
                return None;
            }
            list.child(0)?
        }
        NodeKind::SwitchStmt => node.child(0)?,
        NodeKind::RepeatWhileStmt => node.children().last()?,
        _ => return None,
    };
    (candidate.kind() == NodeKind::TupleExpr).then_some(candidate)
}

/// The expression of a one-element, unlabeled tuple.
fn sole_unlabeled_element(tuple: NodeRef<'_>) -> Option<NodeRef<'_>> {
    if tuple.children().len() != 1 {
        return None;
    }
    let argument = tuple.child(0)?;
    if argument.kind() != NodeKind::Argument || argument.direct_tokens().next().is_some() {
        return None;
    }
    argument.child(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&RedundantParentheses::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_detects_if_condition() {
        let code = "if (x == 5) {\n  foo()\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(&code[violations[0].span.range()], "(x == 5)");
        assert_eq!(fixed(code, &violations), "if x == 5 {\n  foo()\n}\n");
    }

    #[test]
    fn test_inserts_spaces_when_glued() {
        let code = "while(running){ tick() }\n";
        let violations = check_code(code);
        assert_eq!(fixed(code, &violations), "while running { tick() }\n");
    }

    #[test]
    fn test_switch_and_repeat_while() {
        let code = "switch (value) {\ncase 1: break\ndefault: break\n}\nrepeat { n -= 1 } while (n > 0)\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("switch"));
        assert_eq!(
            fixed(code, &violations),
            "switch value {\ncase 1: break\ndefault: break\n}\nrepeat { n -= 1 } while n > 0\n"
        );
    }

    #[test]
    fn test_ignores_partial_parentheses() {
        assert!(check_code("if (a || b) && c { }\n").is_empty());
        assert!(check_code("if (a).isEmpty { }\n").is_empty());
        assert!(check_code("if let x = (y) { }\n").is_empty());
        assert!(check_code("guard (a), b else { return }\n").is_empty());
    }

    #[test]
    fn test_ignores_tuples_and_closures() {
        assert!(check_code("if (a, b) == (1, 2) { }\n").is_empty());
        assert!(check_code("if (items.contains { $0 > 1 }) { }\n").is_empty());
    }

    #[test]
    fn test_no_fix_across_comments() {
        let code = "if (ready /* soon */) { }\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].edit().is_none());
    }
}
