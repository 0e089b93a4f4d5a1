//! Turns a [`Config`] into a ready [`Linter`].
//!
//! Resolution order for the preset and the failure threshold is: explicit
//! argument, then the configuration, then the default (`recommended`,
//! `error`).

use swift_style_core::{Config, Linter, LinterError, RuleRegistry, Severity};
use swift_style_rules::Preset;
use thiserror::Error;
use tracing::debug;

/// Errors raised while turning a configuration into a linter.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The preset name is not one of the built-in presets.
    #[error("unknown preset `{0}`. Valid presets: recommended, strict, minimal")]
    UnknownPreset(String),

    /// The `fail_on` value is not a severity.
    #[error("unknown severity `{0}`. Valid values: error, warning, info")]
    UnknownSeverity(String),

    /// The linter rejected the configuration.
    #[error(transparent)]
    Linter(#[from] LinterError),
}

/// Resolves the effective preset from explicit argument > config > default.
///
/// # Errors
///
/// Returns [`SetupError::UnknownPreset`] for a name that is not a preset.
pub fn resolve_preset(explicit: Option<&str>, config: &Config) -> Result<Preset, SetupError> {
    let name = explicit.or(config.preset.as_deref()).unwrap_or("recommended");
    Preset::from_name(name).ok_or_else(|| SetupError::UnknownPreset(name.to_string()))
}

/// Resolves the effective `fail_on` severity from explicit argument >
/// config > default ("error").
///
/// # Errors
///
/// Returns [`SetupError::UnknownSeverity`] for a value that is not a
/// severity.
pub fn resolve_fail_on(explicit: Option<&str>, config: &Config) -> Result<Severity, SetupError> {
    let name = explicit.or(config.fail_on.as_deref()).unwrap_or("error");
    name.parse()
        .map_err(|_| SetupError::UnknownSeverity(name.to_string()))
}

/// Registry holding the rules of `preset` with `[rules.<name>]` options
/// applied.
#[must_use]
pub fn build_registry(preset: Preset, config: &Config) -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    for rule in preset.configured_rules(config) {
        registry.register(rule);
    }
    registry
}

/// Builds a linter for `config`, using its preset and rule options.
///
/// # Errors
///
/// Returns an error if the preset or `fail_on` value is unknown, or if the
/// linter rejects the configuration (unknown ids in `enabled_rules`, zero
/// `indent_width`, blank suppression marker).
pub fn linter_from_config(config: Config) -> Result<Linter, SetupError> {
    let preset = resolve_preset(None, &config)?;
    resolve_fail_on(None, &config)?;
    let registry = build_registry(preset, &config);
    debug!(preset = preset.name(), rules = registry.len(), "building linter");
    Ok(Linter::builder().config(config).registry(registry).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_preset_defaults_to_recommended() {
        let config = Config::default();
        assert_eq!(resolve_preset(None, &config).unwrap(), Preset::Recommended);
    }

    #[test]
    fn resolve_preset_argument_takes_precedence() {
        let mut config = Config::default();
        config.preset = Some("minimal".to_string());
        assert_eq!(resolve_preset(Some("strict"), &config).unwrap(), Preset::Strict);
        assert_eq!(resolve_preset(None, &config).unwrap(), Preset::Minimal);
    }

    #[test]
    fn resolve_preset_rejects_unknown_names() {
        let err = resolve_preset(Some("nonexistent"), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("unknown preset `nonexistent`"));
    }

    #[test]
    fn resolve_fail_on_precedence() {
        let mut config = Config::default();
        assert_eq!(resolve_fail_on(None, &config).unwrap(), Severity::Error);
        config.fail_on = Some("info".to_string());
        assert_eq!(resolve_fail_on(None, &config).unwrap(), Severity::Info);
        assert_eq!(resolve_fail_on(Some("warning"), &config).unwrap(), Severity::Warning);
    }

    #[test]
    fn resolve_fail_on_rejects_unknown_values() {
        let err = resolve_fail_on(Some("critical"), &Config::default()).unwrap_err();
        assert!(matches!(err, SetupError::UnknownSeverity(_)));
    }

    #[test]
    fn linter_from_config_uses_preset() {
        let config = Config::parse("preset = \"minimal\"\n").unwrap();
        let linter = linter_from_config(config).unwrap();
        assert_eq!(linter.rule_count(), 6);
    }

    #[test]
    fn linter_from_config_reports_unknown_rules() {
        let config = Config::parse("[lint]\nenabled_rules = [\"no-such-rule\"]\n").unwrap();
        let err = linter_from_config(config).unwrap_err();
        assert!(matches!(err, SetupError::Linter(LinterError::UnknownRule(_))));
    }
}
