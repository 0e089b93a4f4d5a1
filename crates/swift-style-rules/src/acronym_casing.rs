//! Rule requiring acronyms in declared names to be fully capitalized.
//!
//! `imageUrl` becomes `imageURL` and `UserId` becomes `UserID`. A value name
//! may start with a lower-case acronym (`urlSession`); that position is
//! left alone for values.
//!
//! # Configuration
//!
//! - `acronyms`: Words treated as acronyms (default: [`DEFAULT_ACRONYMS`])

use crate::utils::{camel_words, declared_name, name_kind, unescaped, NameKind, NAMED_DECLARATIONS};
use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, TextEdit, Violation,
};

/// Rule code for acronym-casing.
pub const CODE: &str = "SW503";

/// Rule name for acronym-casing.
pub const NAME: &str = "acronym-casing";

/// Acronyms checked when none are configured.
pub const DEFAULT_ACRONYMS: &[&str] = &[
    "API", "CSS", "DNS", "FTP", "GIF", "HTML", "HTTP", "HTTPS", "ID", "JPEG", "JSON", "PDF",
    "PNG", "RGB", "SQL", "SSH", "TCP", "UDP", "UI", "URL", "UUID", "XML",
];

/// Requires acronyms to be written in capitals.
#[derive(Debug, Clone)]
pub struct AcronymCasing {
    /// Upper-case acronyms to enforce.
    pub acronyms: Vec<String>,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for AcronymCasing {
    fn default() -> Self {
        Self::new()
    }
}

impl AcronymCasing {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            acronyms: DEFAULT_ACRONYMS.iter().map(ToString::to_string).collect(),
            severity: Severity::Info,
        }
    }

    /// Replaces the acronym list. Entries are upper-cased.
    #[must_use]
    pub fn acronyms<I, S>(mut self, acronyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.acronyms = acronyms
            .into_iter()
            .map(|a| a.as_ref().to_uppercase())
            .collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_acronym(&self, word: &str) -> bool {
        let mut chars = word.chars();
        let title_case = chars.next().is_some_and(char::is_uppercase)
            && chars.as_str().chars().all(char::is_lowercase)
            && !chars.as_str().is_empty();
        title_case && self.acronyms.iter().any(|a| a == &word.to_uppercase())
    }
}

impl Rule for AcronymCasing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires acronyms in names to be fully capitalized"
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
        NAMED_DECLARATIONS
    }

    fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
        let Some((_, token)) = declared_name(node) else {
            return Vec::new();
        };
        let name = unescaped(&token.text);
        let skip = usize::from(name_kind(node.kind()) == NameKind::Value);
        let offenders: Vec<(usize, &str)> = camel_words(name)
            .into_iter()
            .enumerate()
            .filter(|&(i, (_, word))| i >= skip && self.is_acronym(word))
            .map(|(_, w)| w)
            .collect();
        let Some(&(_, first)) = offenders.first() else {
            return Vec::new();
        };

        let mut renamed = name.to_string();
        for &(offset, word) in &offenders {
            renamed.replace_range(offset..offset + word.len(), &word.to_uppercase());
        }
        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            token.span,
            format!(
                "Acronym `{first}` in `{name}` should be written `{}`",
                first.to_uppercase()
            ),
        )
        .with_suggestion(Suggestion::with_fix(
            format!("Rename to `{renamed}`"),
            TextEdit::new(token.span, token.text.replacen(name, &renamed, 1)),
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{fixed, run_rule};

    fn check_code(code: &str) -> Vec<Violation> {
        run_rule(&AcronymCasing::new(), "Sources/App/Main.swift", code)
    }

    #[test]
    fn test_capitalizes_acronyms() {
        let code = "struct UserId {}\nlet imageUrl = URL(string: s)\nfunc loadJsonFromUrl() {}\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].message, "Acronym `Id` in `UserId` should be written `ID`");
        assert_eq!(
            fixed(code, &violations),
            "struct UserID {}\nlet imageURL = URL(string: s)\nfunc loadJSONFromURL() {}\n"
        );
    }

    #[test]
    fn test_leading_value_acronym_is_allowed() {
        assert!(check_code("let urlSession = s\nlet idCount = 1\n").is_empty());
        assert_eq!(check_code("class Url {}\n").len(), 1);
    }

    #[test]
    fn test_ignores_words_that_are_not_acronyms() {
        assert!(check_code("let identity = 1\nlet userIdentifier = 2\nlet userID = 3\n").is_empty());
    }

    #[test]
    fn test_custom_acronyms() {
        let rule = AcronymCasing::new().acronyms(["sdk"]);
        let violations = run_rule(&rule, "Sources/App/Main.swift", "let appSdk = 1\nlet userId = 2\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(fixed("let appSdk = 1\n", &violations), "let appSDK = 1\n");
    }
}
