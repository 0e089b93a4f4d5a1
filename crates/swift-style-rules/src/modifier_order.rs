//! Rule requiring access modifiers to lead a declaration's modifiers.
//!
//! ```text
//! static public func make()       // flagged
//! public static func make()       // preferred
//! ```
//!
//! The fix moves every access modifier, including setter forms such as
//! `private(set)`, to the front and keeps the relative order otherwise.

use swift_style_core::token::ACCESS_MODIFIERS;
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Span, Suggestion, TextEdit,
    TokenKind, Violation,
};

/// Rule code for modifier-order.
pub const CODE: &str = "SW601";

/// Rule name for modifier-order.
pub const NAME: &str = "modifier-order";

/// Requires access modifiers before other modifiers.
#[derive(Debug, Clone)]
pub struct ModifierOrder {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ModifierOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierOrder {
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

/// One modifier word with its optional `(set)` suffix.
struct Unit<'a> {
    word: &'a str,
    span: Span,
}

impl Unit<'_> {
    fn is_access(&self) -> bool {
        ACCESS_MODIFIERS.contains(&self.word)
    }
}

fn units(node: NodeRef<'_>) -> Vec<Unit<'_>> {
    let mut units: Vec<Unit<'_>> = Vec::new();
    let mut depth = 0usize;
    for (_, token) in node.code_tokens() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
        match units.last_mut() {
            Some(unit) if depth > 0 || token.kind == TokenKind::RParen => {
                unit.span = unit.span.cover(token.span);
            }
            _ => units.push(Unit {
                word: &token.text,
                span: token.span,
            }),
        }
    }
    units
}

impl Rule for ModifierOrder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires access modifiers to come first"
    }

    fn category(&self) -> Category {
        Category::Modifiers
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn fixable(&self) -> bool {
        true
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::ModifierList]
    }

    fn check(&self, node: NodeRef<'_>, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let units = units(node);
        let Some(first_other) = units.iter().position(|u| !u.is_access()) else {
            return Vec::new();
        };
        let Some(misplaced) = units[first_other..].iter().find(|u| u.is_access()) else {
            return Vec::new();
        };
        let (Some(head), Some(tail)) = (units.first(), units.last()) else {
            return Vec::new();
        };
        let span = head.span.cover(tail.span);

        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            span,
            format!(
                "Access modifier `{}` should come before `{}`",
                &ctx.source[misplaced.span.range()],
                units[first_other].word
            ),
        );
        if node.tokens().iter().any(|t| t.kind.is_comment()) {
            return vec![violation.with_suggestion(Suggestion::new(
                "Move the access modifier to the front",
            ))];
        }

        let reordered = units
            .iter()
            .filter(|u| u.is_access())
            .chain(units.iter().filter(|u| !u.is_access()))
            .map(|u| &ctx.source[u.span.range()])
            .collect::<Vec<_>>()
            .join(" ");
        vec![violation.with_suggestion(Suggestion::with_fix(
            format!("Reorder as `{reordered}`"),
            TextEdit::new(span, reordered),
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&ModifierOrder::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_moves_access_modifier_first() {
        let code = "struct S {\n  static public func make() {}\n  override final private(set) var x = 1\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, "Access modifier `public` should come before `static`");
        assert_eq!(
            fixed(code, &violations),
            "struct S {\n  public static func make() {}\n  private(set) override final var x = 1\n}\n"
        );
    }

    #[test]
    fn test_accepts_leading_access() {
        let code = "public private(set) var count = 0\nprivate static let shared = S()\nfinal class C {}\n";
        assert!(check_code(code).is_empty());
    }

    #[test]
    fn test_comments_block_the_fix() {
        let violations = check_code("static /* shared */ public let x = 1\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].edit().is_none());
    }
}
