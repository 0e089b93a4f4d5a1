//! Rule requiring `let`/`var` on each bound element of a case pattern.
//!
//! # Rationale
//!
//! A binding keyword placed before the whole pattern hides which parts are
//! bound and which are matched:
//!
//! ```text
//! case let .success(value, count):        // flagged
//! case .success(let value, let count):    // preferred
//! ```
//!
//! # Fix
//!
//! When every element is a plain name (or `_`), the keyword is moved onto
//! each named element. Patterns with nested or matched elements are
//! reported without a fix.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, TokenKind,
    Violation,
};

/// Rule code for case-pattern-binding.
pub const CODE: &str = "SW303";

/// Rule name for case-pattern-binding.
pub const NAME: &str = "case-pattern-binding";

/// Requires per-element bindings in `case` patterns.
#[derive(Debug, Clone)]
pub struct CasePatternBinding {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for CasePatternBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl CasePatternBinding {
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

impl Rule for CasePatternBinding {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Places let/var on each element of a case pattern"
    }

    fn category(&self) -> Category {
        Category::Optionals
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn fixable(&self) -> bool {
        true
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::BindingPattern]
    }

    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        if node.parent().map(NodeRef::kind) != Some(NodeKind::CasePattern) {
            return Vec::new();
        }
        let Some((_, keyword)) = node.first_token() else {
            return Vec::new();
        };
        let Some(inner) = node.child(0) else {
            return Vec::new();
        };
        let elements: Vec<NodeRef<'_>> = match inner.kind() {
            NodeKind::CallExpr => match inner.find_child(NodeKind::ArgumentList) {
                Some(args) => args.children().collect(),
                None => return Vec::new(),
            },
            NodeKind::TupleExpr => inner.children().collect(),
            _ => return Vec::new(),
        };
        if elements.is_empty() {
            return Vec::new();
        }

        let keyword = keyword.text.as_str();
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            node.span(),
            format!("`{keyword}` should be applied to each bound element of the pattern"),
        );

        let names: Option<Vec<NodeRef<'_>>> = elements.iter().map(|e| plain_name(*e)).collect();
        let Some(names) = names else {
            return vec![violation.with_suggestion(Suggestion::new(format!(
                "Write `{keyword}` before each element that binds a value"
            )))];
        };

        let base = inner.span().start;
        let mut rewritten = ctx.source[inner.span().range()].to_string();
        for name in names.iter().rev() {
            if name.text() == "_" {
                continue;
            }
            rewritten.insert_str(name.span().start - base, &format!("{keyword} "));
        }
        vec![violation.with_suggestion(Suggestion::with_fix(
            format!("Move `{keyword}` onto each element"),
            TextEdit::new(node.span(), rewritten),
        ))]
    }
}

/// The name an element binds, if the element is an unlabeled bare name.
fn plain_name(element: NodeRef<'_>) -> Option<NodeRef<'_>> {
    if element.kind() != NodeKind::Argument || element.direct_tokens().next().is_some() {
        return None;
    }
    let value = element.child(0)?;
    let single = value.code_tokens().count() == 1
        && value
            .first_token()
            .is_some_and(|(_, t)| t.kind == TokenKind::Identifier);
    (value.kind() == NodeKind::IdentifierExpr && single).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&CasePatternBinding::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_rewrites_case_statement() {
        let code = "case let .double(first, second) = value\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            fixed(code, &violations),
            "case .double(let first, let second) = value\n"
        );
    }

    #[test]
    fn test_rewrites_switch_case_with_wildcard() {
        let code = "switch result {\ncase var .success(value, _):\n  use(value)\ndefault:\n  break\n}\n";
        let violations = check_code(code);
        assert_eq!(
            fixed(code, &violations),
            "switch result {\ncase .success(var value, _):\n  use(value)\ndefault:\n  break\n}\n"
        );
    }

    #[test]
    fn test_tuple_patterns() {
        let code = "if case let (a, b) = pair { }\n";
        let violations = check_code(code);
        assert_eq!(fixed(code, &violations), "if case (let a, let b) = pair { }\n");
    }

    #[test]
    fn test_nested_elements_have_no_fix() {
        let violations = check_code("case let .node(.leaf(x), y) = tree\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].edit().is_none());
    }

    #[test]
    fn test_accepts_per_element_bindings() {
        assert!(check_code("case .double(let first, let second) = value\n").is_empty());
        assert!(check_code("if case let x? = maybe { }\n").is_empty());
        assert!(check_code("if let x = maybe { }\n").is_empty());
    }
}
