//! Rule requiring `UpperCamelCase` type names.
//!
//! Applies to structs, classes, enums, protocols, actors, type aliases,
//! associated types and generic parameters. A leading underscore is
//! allowed. A lower-case first letter is fixed in place; names with inner
//! underscores are reported without a fix.

use crate::utils::{declared_name, unescaped};
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, Violation,
};

/// Rule code for type-name-casing.
pub const CODE: &str = "SW501";

/// Rule name for type-name-casing.
pub const NAME: &str = "type-name-casing";

/// Requires type names to start with an upper-case letter.
#[derive(Debug, Clone)]
pub struct TypeNameCasing {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for TypeNameCasing {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeNameCasing {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Info,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for TypeNameCasing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires UpperCamelCase type names"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn fixable(&self) -> bool {
        true
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[
            NodeKind::TypeDecl,
            NodeKind::TypeAliasDecl,
            NodeKind::GenericParameter,
        ]
    }

    fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
        let Some((_, token)) = declared_name(node) else {
            return Vec::new();
        };
        let name = unescaped(&token.text);
        let body = name.trim_start_matches('_');
        let Some(first) = body.chars().next() else {
            return Vec::new();
        };
        let snake = body.contains('_');
        if !first.is_lowercase() && !snake {
            return Vec::new();
        }

        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            token.span,
            format!("Type name `{name}` should be UpperCamelCase"),
        );
        if snake {
            return vec![violation.with_suggestion(Suggestion::new(
                "Join the words and capitalize each one",
            ))];
        }
        let prefix = &name[..name.len() - body.len()];
        let renamed = format!(
            "{prefix}{}{}",
            first.to_uppercase(),
            &body[first.len_utf8()..]
        );
        vec![violation.with_suggestion(Suggestion::with_fix(
            format!("Rename to `{renamed}`"),
            TextEdit::new(token.span, token.text.replacen(name, &renamed, 1)),
        ))]
    }
}
