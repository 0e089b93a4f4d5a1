//! Rule engine: one traversal per file, suppression, canonical ordering.

use crate::config::Config;
use crate::context::RuleContext;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleBox};
use crate::span::{LineIndex, Span};
use crate::suppression;
use crate::syntax::SyntaxTree;
use crate::types::{
    Category, Diagnostic, LintResult, Location, Severity, Suggestion, Violation,
};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A diagnostic code owned by the engine rather than by a catalog rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCode {
    /// Code (e.g., "SW001").
    pub code: &'static str,
    /// Kebab-case name.
    pub name: &'static str,
    /// Default severity.
    pub severity: Severity,
    /// Brief description.
    pub description: &'static str,
}

/// Unterminated string literal or block comment.
pub const UNTERMINATED_LITERAL: EngineCode = EngineCode {
    code: "SW001",
    name: "unterminated-literal",
    severity: Severity::Error,
    description: "String literal or block comment runs to end of file",
};

/// Unexpected token skipped by the tree builder.
pub const SYNTAX_ERROR: EngineCode = EngineCode {
    code: "SW002",
    name: "syntax-error",
    severity: Severity::Warning,
    description: "Input the tree builder could not parse",
};

/// A rule panicked while checking a node.
pub const INTERNAL_RULE_ERROR: EngineCode = EngineCode {
    code: "SW003",
    name: "internal-rule-error",
    severity: Severity::Error,
    description: "A rule failed while checking a node",
};

/// A suppression marker names an unknown rule.
pub const INVALID_SUPPRESSION: EngineCode = EngineCode {
    code: "SW004",
    name: "invalid-suppression",
    severity: Severity::Info,
    description: "Suppression marker names a rule that does not exist",
};

/// All engine-owned codes.
pub const ENGINE_CODES: &[EngineCode] = &[
    UNTERMINATED_LITERAL,
    SYNTAX_ERROR,
    INTERNAL_RULE_ERROR,
    INVALID_SUPPRESSION,
];

impl EngineCode {
    fn violation(self, span: Span, message: impl Into<String>) -> Violation {
        Violation::new(self.code, self.name, self.severity, span, message)
    }

    fn matches(self, id: &str) -> bool {
        self.code == id || self.name == id
    }
}

/// Errors that can occur while building a [`Linter`].
#[derive(Debug, Error)]
pub enum LinterError {
    /// `lint.enabled_rules` names a rule that is not registered.
    #[error("Unknown rule '{0}' in enabled_rules")]
    UnknownRule(String),

    /// `lint.indent_width` is zero.
    #[error("indent_width must be at least 1")]
    InvalidIndentWidth,

    /// `lint.suppression_marker` is blank.
    #[error("suppression_marker must not be empty")]
    EmptySuppressionMarker,
}

/// One file handed to [`Linter::lint_all`].
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// Path for attribution only.
    pub path: PathBuf,
    /// File contents.
    pub source: String,
}

impl SourceInput {
    /// Creates a new input.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    registry: RuleRegistry,
    config: Option<Config>,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.registry.register(Box::new(rule));
        self
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.registry.register(rule);
        self
    }

    /// Adds every rule of a prepared registry.
    #[must_use]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        if self.registry.is_empty() {
            self.registry = registry;
        } else {
            self.registry.extend(registry.into_rules());
        }
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if `enabled_rules` names an unknown rule, if
    /// `indent_width` is zero, or if the suppression marker is blank.
    pub fn build(self) -> Result<Linter, LinterError> {
        let config = self.config.unwrap_or_default();
        let registry = self.registry;

        if config.lint.indent_width == 0 {
            return Err(LinterError::InvalidIndentWidth);
        }
        if config.lint.suppression_marker.trim().is_empty() {
            return Err(LinterError::EmptySuppressionMarker);
        }
        if let Some(ids) = &config.lint.enabled_rules {
            if let Some(unknown) = ids
                .iter()
                .find(|id| !registry.contains(id) && !ENGINE_CODES.iter().any(|c| c.matches(id)))
            {
                return Err(LinterError::UnknownRule(unknown.clone()));
            }
        }

        let settings = registry
            .rules()
            .map(|rule| RuleSettings {
                enabled: config.is_rule_enabled(rule.name(), rule.code()),
                severity: config.rule_severity(rule.name(), rule.code()),
            })
            .collect();

        debug!(rules = registry.len(), "linter built");
        Ok(Linter {
            registry,
            config,
            settings,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct RuleSettings {
    enabled: bool,
    severity: Option<Severity>,
}

/// Lints source buffers with a fixed rule registry.
///
/// Use [`Linter::builder()`] to construct an instance. A linter is immutable
/// once built and can be shared between threads.
pub struct Linter {
    registry: RuleRegistry,
    config: Config,
    settings: Vec<RuleSettings>,
}

impl std::fmt::Debug for Linter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linter")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// The configuration the linter was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of enabled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.settings.iter().filter(|s| s.enabled).count()
    }

    /// Returns true if `diagnostics` contain anything at or above the
    /// configured `fail_on` threshold. Diagnostics whose fix was applied
    /// do not count.
    #[must_use]
    pub fn fails(&self, diagnostics: &[Diagnostic]) -> bool {
        let threshold = self.config.fail_on_severity();
        diagnostics
            .iter()
            .any(|d| !d.fix_applied && d.severity >= threshold)
    }

    /// Lints one buffer. `path` is used for attribution only.
    ///
    /// Never fails: lexer and parser problems, rule panics and bad
    /// suppression markers all become diagnostics.
    #[must_use]
    pub fn lint(&self, path: &Path, source: &str) -> Vec<Diagnostic> {
        let tree = SyntaxTree::parse(source);
        let index = LineIndex::new(source);
        let ctx = RuleContext::new(path, source, &tree, &index)
            .with_indent_width(self.config.lint.indent_width);

        let mut found: Vec<(Violation, Category)> = Vec::new();

        for error in tree.lex_errors() {
            found.push((
                UNTERMINATED_LITERAL.violation(error.span(), error.to_string()),
                Category::Syntax,
            ));
        }
        for error in tree.errors() {
            found.push((
                SYNTAX_ERROR.violation(error.span, error.message.clone()),
                Category::Syntax,
            ));
        }

        let root = tree.root();
        for node in std::iter::once(root).chain(root.descendants()) {
            for &rule_index in self.registry.indices_for(node.kind()) {
                if !self.settings[rule_index].enabled {
                    continue;
                }
                let Some(rule) = self.registry.rule_at(rule_index) else {
                    continue;
                };
                match catch_unwind(AssertUnwindSafe(|| rule.check(node, &ctx))) {
                    Ok(violations) => {
                        let severity = self.settings[rule_index].severity;
                        found.extend(violations.into_iter().map(|mut v| {
                            if let Some(severity) = severity {
                                v.severity = severity;
                            }
                            (v, rule.category())
                        }));
                    }
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        warn!(
                            rule = rule.code(),
                            file = %path.display(),
                            "rule panicked: {reason}"
                        );
                        let violation = INTERNAL_RULE_ERROR
                            .violation(
                                node.span(),
                                format!("rule '{}' failed on this node: {reason}", rule.name()),
                            )
                            .with_suggestion(Suggestion::new(format!(
                                "offending rule {}; disable it with `[rules.{}] enabled = false`",
                                rule.code(),
                                rule.code()
                            )));
                        found.push((violation, Category::Syntax));
                    }
                }
            }
        }

        let spans = suppression::collect(&tree, &self.config.lint.suppression_marker);
        for span in &spans {
            for id in &span.ids {
                let known = self.registry.contains(id) || ENGINE_CODES.iter().any(|c| c.matches(id));
                if !known {
                    found.push((
                        INVALID_SUPPRESSION
                            .violation(span.comment, format!("unknown rule '{id}' in suppression")),
                        Category::Syntax,
                    ));
                }
            }
        }

        let mut diagnostics: Vec<Diagnostic> = found
            .into_iter()
            .map(|(mut violation, category)| {
                if category == Category::Syntax {
                    if let Some(severity) = self.config.rule_severity(&violation.rule, &violation.code) {
                        violation.severity = severity;
                    }
                }
                let location =
                    Location::from_span(path.to_path_buf(), source, &index, violation.span);
                Diagnostic::from_violation(violation, category, location)
            })
            .filter(|d| self.engine_code_enabled(d))
            .filter(|d| !spans.iter().any(|s| s.suppresses(d)))
            .collect();

        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        debug!(
            file = %path.display(),
            diagnostics = diagnostics.len(),
            suppressions = spans.len(),
            "linted buffer"
        );
        diagnostics
    }

    fn engine_code_enabled(&self, diagnostic: &Diagnostic) -> bool {
        diagnostic.category != Category::Syntax
            || self
                .config
                .rule(&diagnostic.rule, &diagnostic.code)
                .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Lints many buffers in parallel and returns their diagnostics in input
    /// order.
    ///
    /// At most `files.parallelism` workers run (default: available
    /// parallelism). Each worker claims the next unclaimed input; the
    /// registry is shared read-only.
    #[must_use]
    pub fn lint_all(&self, inputs: &[SourceInput]) -> LintResult {
        let workers = self
            .config
            .files
            .parallelism
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
            .clamp(1, inputs.len().max(1));
        info!(files = inputs.len(), workers, "linting files");

        let next = AtomicUsize::new(0);
        let mut per_file: Vec<(usize, Vec<Diagnostic>)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::Relaxed);
                            let Some(input) = inputs.get(i) else { break };
                            done.push((i, self.lint(&input.path, &input.source)));
                        }
                        done
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_default())
                .collect()
        });
        per_file.sort_by_key(|(i, _)| *i);

        let mut result = LintResult::new();
        result.files_checked = per_file.len();
        result.diagnostics = per_file.into_iter().flat_map(|(_, d)| d).collect();

        let (errors, warnings, infos) = result.count_by_severity();
        info!(errors, warnings, infos, files = result.files_checked, "lint complete");
        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
