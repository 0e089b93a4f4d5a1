//! Rule presets for common configurations.

use crate::{
    acronym_casing, force_unwrap, implicitly_unwrapped_optional, AcronymCasing, BraceStyle,
    CasePatternBinding, EmptyCaseBody, FallthroughOnlyCase, ForceUnwrap,
    ImplicitlyUnwrappedOptional, ModifierOrder, NoSemicolons, NoTabIndentation,
    PunctuationSpacing, RedundantParentheses, TrailingClosure, TrailingWhitespace,
    TypeNameCasing, ValueNameCasing,
};
use swift_style_core::{Config, RuleBox, Severity};
use tracing::warn;

/// Preset configurations for swift-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every rule at its default severity.
    #[default]
    Recommended,
    /// Every rule, with naming promoted to warnings and force unwraps to
    /// errors even in tests.
    Strict,
    /// Layout rules only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// All presets, in documentation order.
    pub const ALL: [Preset; 3] = [Self::Recommended, Self::Strict, Self::Minimal];

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        self.configured_rules(&Config::default())
    }

    /// Returns the rules for this preset with options from `[rules.<name>]`
    /// applied. Options of the wrong type are logged and ignored.
    #[must_use]
    pub fn configured_rules(self, config: &Config) -> Vec<RuleBox> {
        let options = Options(config);
        match self {
            Self::Recommended => recommended(&options),
            Self::Strict => strict(&options),
            Self::Minimal => layout_rules(),
        }
    }

    /// Preset name as written in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Looks up a preset by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

struct Options<'a>(&'a Config);

impl Options<'_> {
    fn bool(&self, name: &str, code: &str, key: &str, default: bool) -> bool {
        let Some(rule) = self.0.rule(name, code) else {
            return default;
        };
        if !rule.options.contains_key(key) {
            return default;
        }
        rule.get_option::<bool>(key).unwrap_or_else(|| {
            warn!(rule = name, option = key, "expected a boolean, using default");
            default
        })
    }

    fn strings(&self, name: &str, code: &str, key: &str) -> Option<Vec<String>> {
        let rule = self.0.rule(name, code)?;
        if !rule.options.contains_key(key) {
            return None;
        }
        let value = rule.get_option::<Vec<String>>(key);
        if value.is_none() {
            warn!(rule = name, option = key, "expected an array of strings, using default");
        }
        value
    }

    fn force_unwrap(&self, default_allow: bool) -> ForceUnwrap {
        ForceUnwrap::new().allow_in_tests(self.bool(
            force_unwrap::NAME,
            force_unwrap::CODE,
            "allow_in_tests",
            default_allow,
        ))
    }

    fn implicitly_unwrapped_optional(&self) -> ImplicitlyUnwrappedOptional {
        ImplicitlyUnwrappedOptional::new().allow_in_tests(self.bool(
            implicitly_unwrapped_optional::NAME,
            implicitly_unwrapped_optional::CODE,
            "allow_in_tests",
            true,
        ))
    }

    fn acronym_casing(&self) -> AcronymCasing {
        match self.strings(acronym_casing::NAME, acronym_casing::CODE, "acronyms") {
            Some(list) => AcronymCasing::new().acronyms(list),
            None => AcronymCasing::new(),
        }
    }
}

fn layout_rules() -> Vec<RuleBox> {
    vec![
        Box::new(RedundantParentheses::new()),
        Box::new(NoTabIndentation::new()),
        Box::new(BraceStyle::new()),
        Box::new(PunctuationSpacing::new()),
        Box::new(TrailingWhitespace::new()),
        Box::new(NoSemicolons::new()),
    ]
}

fn recommended(options: &Options<'_>) -> Vec<RuleBox> {
    let mut rules = layout_rules();
    let rest: [RuleBox; 10] = [
        Box::new(TrailingClosure::new()),
        Box::new(options.force_unwrap(true)),
        Box::new(options.implicitly_unwrapped_optional()),
        Box::new(CasePatternBinding::new()),
        Box::new(EmptyCaseBody::new()),
        Box::new(FallthroughOnlyCase::new()),
        Box::new(TypeNameCasing::new()),
        Box::new(ValueNameCasing::new()),
        Box::new(options.acronym_casing()),
        Box::new(ModifierOrder::new()),
    ];
    rules.extend(rest);
    rules
}

fn strict(options: &Options<'_>) -> Vec<RuleBox> {
    let mut rules = layout_rules();
    let rest: [RuleBox; 10] = [
        Box::new(TrailingClosure::new()),
        Box::new(options.force_unwrap(false).severity(Severity::Error)),
        Box::new(options.implicitly_unwrapped_optional()),
        Box::new(CasePatternBinding::new()),
        Box::new(EmptyCaseBody::new()),
        Box::new(FallthroughOnlyCase::new()),
        Box::new(TypeNameCasing::new().severity(Severity::Warning)),
        Box::new(ValueNameCasing::new().severity(Severity::Warning)),
        Box::new(options.acronym_casing().severity(Severity::Warning)),
        Box::new(ModifierOrder::new()),
    ];
    rules.extend(rest);
    rules
}

/// Returns the recommended set of rules: the whole catalog at default
/// severities.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    Preset::Recommended.rules()
}

/// Returns the strict set of rules.
///
/// Same catalog as [`recommended_rules`] plus:
/// - naming rules (SW501-SW503) reported as warnings
/// - `force-unwrap` (SW301) reported as an error, tests included
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    Preset::Strict.rules()
}

/// Returns the minimal set of rules: layout only (SW101-SW106).
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    Preset::Minimal.rules()
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    recommended_rules()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swift_style_core::Category;

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.rules().len(), 16);
        assert_eq!(Preset::Strict.rules().len(), 16);
        assert!(Preset::Minimal
            .rules()
            .iter()
            .all(|r| r.category() == Category::Layout));
    }

    #[test]
    fn test_codes_are_unique_and_sorted() {
        let codes: Vec<&str> = all_rules().iter().map(|r| r.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_strict_promotions() {
        let rules = strict_rules();
        let severity = |code: &str| {
            rules
                .iter()
                .find(|r| r.code() == code)
                .map(|r| r.default_severity())
        };
        assert_eq!(severity("SW301"), Some(Severity::Error));
        assert_eq!(severity("SW502"), Some(Severity::Warning));
        assert_eq!(severity("SW105"), Some(Severity::Info));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Preset::from_name("strict"), Some(Preset::Strict));
        assert_eq!(Preset::from_name("loose"), None);
        assert_eq!(Preset::default().name(), "recommended");
    }

    #[test]
    fn test_options_from_config() {
        let config = Config::parse(
            "[rules.acronym-casing]\nacronyms = [\"sdk\"]\n\n[rules.SW301]\nallow_in_tests = \"nope\"\n",
        )
        .unwrap();
        let options = Options(&config);
        assert_eq!(options.acronym_casing().acronyms, vec!["SDK".to_string()]);
        assert!(options.force_unwrap(true).allow_in_tests);
    }
}
