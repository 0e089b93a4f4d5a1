//! Rule requiring `lowerCamelCase` names for functions, variables,
//! parameters and enum cases.
//!
//! # Fix
//!
//! A leading capital is lowered (`Count` to `count`), and so is a leading
//! acronym (`URLString` to `urlString`). `snake_case` names and `k`-prefixed
//! constants are reported without a fix.

use crate::utils::{camel_words, declared_name, unescaped};
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, Violation,
};

/// Rule code for value-name-casing.
pub const CODE: &str = "SW502";

/// Rule name for value-name-casing.
pub const NAME: &str = "value-name-casing";

/// Requires value names to start with a lower-case letter.
#[derive(Debug, Clone)]
pub struct ValueNameCasing {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ValueNameCasing {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueNameCasing {
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

impl Rule for ValueNameCasing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires lowerCamelCase names for functions, variables and enum cases"
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
            NodeKind::FunctionDecl,
            NodeKind::PatternBinding,
            NodeKind::EnumCaseElement,
            NodeKind::Parameter,
        ]
    }

    fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
        let Some((_, token)) = declared_name(node) else {
            return Vec::new();
        };
        let name = unescaped(&token.text);
        let body = name.trim_start_matches('_');
        let mut chars = body.chars();
        let Some(first) = chars.next() else {
            return Vec::new();
        };

        let violation = |message: String| {
            Violation::new(CODE, NAME, self.severity, token.span, message)
        };
        if body.contains('_') {
            return vec![violation(format!("Name `{name}` should be lowerCamelCase, not snake_case"))
                .with_suggestion(Suggestion::new("Join the words and capitalize all but the first"))];
        }
        if first == 'k' && chars.next().is_some_and(char::is_uppercase) {
            return vec![violation(format!("Name `{name}` should not use a `k` prefix"))
                .with_suggestion(Suggestion::new("Drop the prefix and start with a lower-case letter"))];
        }
        if !first.is_uppercase() {
            return Vec::new();
        }

        let prefix = &name[..name.len() - body.len()];
        let renamed = format!("{prefix}{}", lower_leading(body));
        vec![
            violation(format!("Name `{name}` should be lowerCamelCase")).with_suggestion(
                Suggestion::with_fix(
                    format!("Rename to `{renamed}`"),
                    TextEdit::new(token.span, token.text.replacen(name, &renamed, 1)),
                ),
            ),
        ]
    }
}

/// Lower-cases the first camel-case word when it is an acronym, otherwise
/// only the first letter.
fn lower_leading(name: &str) -> String {
    let Some(&(_, word)) = camel_words(name).first() else {
        return name.to_string();
    };
    let acronym = word.chars().filter(|c| c.is_alphabetic()).count() > 1
        && word.chars().all(|c| !c.is_lowercase());
    let head_len = if acronym {
        word.len()
    } else {
        word.chars().next().map_or(0, char::len_utf8)
    };
    format!("{}{}", name[..head_len].to_lowercase(), &name[head_len..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&ValueNameCasing::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_lowers_leading_capital_and_acronym() {
        let code = "let Count = 1\nvar URLString = \"\"\nfunc Reload(ID: Int) {}\nenum E {\n  case Small, large\n}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 5);
        assert_eq!(
            fixed(code, &violations),
            "let count = 1\nvar urlString = \"\"\nfunc reload(id: Int) {}\nenum E {\n  case small, large\n}\n"
        );
    }

    #[test]
    fn test_snake_case_and_k_prefix_have_no_fix() {
        let violations = check_code("let max_count = 3\nstatic let kTimeout = 5\n");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, "Name `max_count` should be lowerCamelCase, not snake_case");
        assert_eq!(violations[1].message, "Name `kTimeout` should not use a `k` prefix");
        assert!(violations.iter().all(|v| v.edit().is_none()));
    }

    #[test]
    fn test_accepts_conventional_names() {
        let code = "let _cache = [:]\nfunc load(_ url: URL, into target: Int) {}\nlet `default` = 1\nlet kind = 2\n";
        assert!(check_code(code).is_empty());
    }

    #[test]
    fn test_lower_leading() {
        assert_eq!(lower_leading("URL"), "url");
        assert_eq!(lower_leading("HTTPRequest"), "httpRequest");
        assert_eq!(lower_leading("Name"), "name");
    }
}
