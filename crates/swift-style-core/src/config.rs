//! Configuration types for swift-style.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Default marker recognised in suppression comments.
pub const DEFAULT_SUPPRESSION_MARKER: &str = "swift-style: allow";

/// Top-level configuration for swift-style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use ("recommended", "strict" or "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// File discovery settings, used by the command line front end.
    #[serde(default)]
    pub files: FilesConfig,

    /// Engine settings.
    #[serde(default)]
    pub lint: LintConfig,

    /// Per-rule configurations, keyed by rule name or code.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Configuration entry for a rule, looked up by name first, then code.
    #[must_use]
    pub fn rule(&self, name: &str, code: &str) -> Option<&RuleConfig> {
        self.rules.get(name).or_else(|| self.rules.get(code))
    }

    /// Checks if a rule is enabled by its `[rules.*]` entry and by the
    /// `lint.enabled_rules` allow-list.
    #[must_use]
    pub fn is_rule_enabled(&self, name: &str, code: &str) -> bool {
        let listed = self.lint.enabled_rules.as_ref().map_or(true, |ids| {
            ids.iter().any(|id| id == name || id == code)
        });
        listed
            && self
                .rule(name, code)
                .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, name: &str, code: &str) -> Option<Severity> {
        self.rule(name, code).and_then(|c| c.severity)
    }

    /// All severity overrides, keyed as written.
    #[must_use]
    pub fn severity_overrides(&self) -> BTreeMap<&str, Severity> {
        self.rules
            .iter()
            .filter_map(|(id, c)| c.severity.map(|s| (id.as_str(), s)))
            .collect()
    }

    /// Failure threshold. Unparseable values fall back to `error`.
    #[must_use]
    pub fn fail_on_severity(&self) -> Severity {
        self.fail_on
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Error)
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of files linted in parallel.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            exclude: default_excludes(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Spaces per tab when replacing tab indentation.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Maximum number of lint/fix passes.
    #[serde(default = "default_max_autofix_retries")]
    pub max_autofix_retries: usize,

    /// Marker text recognised in suppression comments.
    #[serde(default = "default_marker")]
    pub suppression_marker: String,

    /// Optional allow-list of rule names or codes. `None` enables every rule
    /// of the preset.
    #[serde(default)]
    pub enabled_rules: Option<Vec<String>>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            max_autofix_retries: default_max_autofix_retries(),
            suppression_marker: default_marker(),
            enabled_rules: None,
        }
    }
}

fn default_excludes() -> Vec<String> {
    vec!["**/.build/**".to_string(), "**/Pods/**".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_indent_width() -> usize {
    2
}

fn default_max_autofix_retries() -> usize {
    3
}

fn default_marker() -> String {
    DEFAULT_SUPPRESSION_MARKER.to_string()
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option. `None` when the key is absent.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        self.options.get(key).and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.files.respect_gitignore);
        assert_eq!(config.lint.indent_width, 2);
        assert_eq!(config.lint.max_autofix_retries, 3);
        assert_eq!(config.lint.suppression_marker, "swift-style: allow");
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_on_severity(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"
fail_on = "warning"

[files]
exclude = ["**/Generated/**"]
parallelism = 2

[lint]
indent_width = 4
enabled_rules = ["force-unwrap", "SW101"]

[rules.force-unwrap]
severity = "error"
allow_in_tests = false

[rules.SW101]
enabled = false
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.fail_on_severity(), Severity::Warning);
        assert_eq!(config.files.exclude, vec!["**/Generated/**"]);
        assert_eq!(config.files.parallelism, Some(2));
        assert_eq!(config.lint.indent_width, 4);

        assert!(config.is_rule_enabled("force-unwrap", "SW301"));
        assert!(!config.is_rule_enabled("redundant-parentheses", "SW101"));
        assert!(!config.is_rule_enabled("trailing-closure", "SW201"));
        assert_eq!(
            config.rule_severity("force-unwrap", "SW301"),
            Some(Severity::Error)
        );
        assert_eq!(config.severity_overrides().len(), 1);

        let rule_config = config.rule("force-unwrap", "SW301").unwrap();
        assert!(!rule_config.get_bool("allow_in_tests", true));
    }

    #[test]
    fn test_string_arrays() {
        let config = Config::parse("[rules.acronym-casing]\nacronyms = [\"URL\", \"ID\"]\n").unwrap();
        let rule = config.rule("acronym-casing", "SW503").unwrap();
        assert_eq!(
            rule.get_str_array("acronyms"),
            Some(vec!["URL".to_string(), "ID".to_string()])
        );
        assert_eq!(rule.get_str_array("missing"), None);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("preset = ").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }
}
