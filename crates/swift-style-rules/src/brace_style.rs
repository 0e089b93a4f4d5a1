//! Rule enforcing K&R ("one true brace") placement.
//!
//! # Rationale
//!
//! An opening brace stays on the line of the construct it opens, and
//! `else` / `catch` follow the closing brace of the previous block on the
//! same line.
//!
//! # Fix
//!
//! The line break before the brace or keyword is replaced by one space.
//! Only applied when nothing but whitespace separates the two; a comment in
//! between leaves the violation unfixed.

use crate::utils::whitespace_gap;
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, Token,
    TokenKind, Violation,
};

/// Rule code for brace-style.
pub const CODE: &str = "SW103";

/// Rule name for brace-style.
pub const NAME: &str = "brace-style";

/// Requires opening braces, `else` and `catch` on the preceding line.
#[derive(Debug, Clone)]
pub struct BraceStyle {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for BraceStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl BraceStyle {
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

impl Rule for BraceStyle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Keeps opening braces, else and catch on the previous line"
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
        let tree = ctx.tree;
        let tokens = tree.tokens();
        let mut violations = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            let Some(what) = placement(ctx, index, token) else {
                continue;
            };
            let Some(prev) = tree.prev_code_token(index) else {
                continue;
            };
            if tokens[prev].line == token.line {
                continue;
            }
            if what != "opening brace" && tokens[prev].kind != TokenKind::RBrace {
                continue;
            }

            let message = format!("{what} should be on the same line as the preceding code");
            let violation = Violation::new(CODE, NAME, self.severity, token.span, message);
            let suggestion = match whitespace_gap(tokens, prev, index) {
                Some(gap) => Suggestion::with_fix("Join it onto the previous line", TextEdit::new(gap, " ")),
                None => Suggestion::new("Move it to the end of the previous line"),
            };
            violations.push(violation.with_suggestion(suggestion));
        }
        violations
    }
}

/// Names the construct if `token` is a brace or keyword this rule places.
fn placement(ctx: &RuleContext<'_>, index: usize, token: &Token) -> Option<&'static str> {
    match token.kind {
        TokenKind::LBrace => {
            let owner = ctx.tree.owner(index);
            let opens_body = match owner.kind() {
                NodeKind::CodeBlock => owner.parent().is_some_and(|p| {
                    !matches!(p.kind(), NodeKind::SourceFile | NodeKind::CodeBlock | NodeKind::SwitchCase)
                }),
                NodeKind::SwitchStmt | NodeKind::PatternBinding | NodeKind::FunctionDecl => true,
                _ => false,
            };
            opens_body.then_some("opening brace")
        }
        TokenKind::Keyword if token.text == "else" => {
            (ctx.tree.owner(index).kind() == NodeKind::IfStmt).then_some("`else`")
        }
        TokenKind::Keyword if token.text == "catch" => Some("`catch`"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&BraceStyle::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_accepts_k_and_r() {
        let code = "func f() {\n  if a {\n    b()\n  } else {\n    c()\n  }\n  do {\n    try d()\n  } catch {\n  }\n}\n";
        assert!(check_code(code).is_empty());
    }

    #[test]
    fn test_detects_allman_braces() {
        let code = "func f()\n{\n  if a\n  {\n    b()\n  }\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 2);
        assert_eq!(
            fixed(code, &violations),
            "func f() {\n  if a {\n    b()\n  }\n}\n"
        );
    }

    #[test]
    fn test_detects_else_and_catch_on_new_line() {
        let code = "if a {\n  b()\n}\nelse {\n  c()\n}\ndo {\n  try d()\n}\ncatch {\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.starts_with("`else`"));
        assert_eq!(
            fixed(code, &violations),
            "if a {\n  b()\n} else {\n  c()\n}\ndo {\n  try d()\n} catch {\n}\n"
        );
    }

    #[test]
    fn test_messages() {
        let code = "struct S\n{\n}\nif a {\n}\nelse {\n}\n";
        let messages: Vec<String> = check_code(code).into_iter().map(|v| v.message).collect();
        insta::assert_snapshot!(messages.join("\n"), @r"
        opening brace should be on the same line as the preceding code
        `else` should be on the same line as the preceding code
        ");
    }

    #[test]
    fn test_type_bodies_and_switches() {
        let code = "struct S\n{\n}\nswitch x\n{\ndefault: break\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_ignores_closures_and_guard_else() {
        assert!(check_code("let f = {\n  1\n}\nlet g =\n{ 2 }\n").is_empty());
        assert!(check_code("guard let x = y\nelse { return }\n").is_empty());
    }

    #[test]
    fn test_comment_blocks_fix() {
        let code = "func f() // note\n{\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].edit().is_none());
    }
}
