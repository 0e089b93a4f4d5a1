//! Core types for violations, diagnostics and results.

use crate::span::{LineIndex, Span};
use miette::{Diagnostic as MietteDiagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Rule category. Drives presets and the idempotence guarantee of autofix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Indentation, braces, punctuation spacing, trailing whitespace.
    Layout,
    /// Closure call syntax.
    Closures,
    /// Force unwraps and pattern payload extraction.
    Optionals,
    /// Switch arms and control transfer.
    ControlFlow,
    /// Identifier casing.
    Naming,
    /// Declaration modifier order.
    Modifiers,
    /// Lexer, parser and engine problems.
    Syntax,
}

impl Category {
    /// Kebab-case name used in configuration and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Closures => "closures",
            Self::Optionals => "optionals",
            Self::ControlFlow => "control-flow",
            Self::Naming => "naming",
            Self::Modifiers => "modifiers",
            Self::Syntax => "syntax",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A replacement of one byte range of the source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextEdit {
    /// Range to replace. Empty for insertions.
    pub span: Span,
    /// New text.
    pub replacement: String,
}

impl TextEdit {
    /// Creates a new edit.
    #[must_use]
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Deletes `span`.
    #[must_use]
    pub fn delete(span: Span) -> Self {
        Self::new(span, "")
    }

    /// Inserts `text` at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(Span::empty(offset), text)
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
    /// Optional automatic edit.
    pub edit: Option<TextEdit>,
}

impl Suggestion {
    /// Creates a new suggestion without automatic fix.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            edit: None,
        }
    }

    /// Creates a new suggestion with automatic fix.
    #[must_use]
    pub fn with_fix(message: impl Into<String>, edit: TextEdit) -> Self {
        Self {
            message: message.into(),
            edit: Some(edit),
        }
    }
}

/// A finding produced by a rule, located by byte span.
///
/// The engine turns violations into [`Diagnostic`]s once file path and
/// line/column information are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "SW101").
    pub code: String,
    /// Rule name (e.g., "redundant-parentheses").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Byte range of the offending construct.
    pub span: Span,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            span,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// The automatic edit, if any.
    #[must_use]
    pub fn edit(&self) -> Option<&TextEdit> {
        self.suggestion.as_ref().and_then(|s| s.edit.as_ref())
    }
}

/// Source code location of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path as given by the caller.
    pub file: PathBuf,
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column (1-indexed, in characters).
    pub column: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed, exclusive, in characters).
    pub end_column: usize,
    /// Byte offset of the start (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a single-point location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
            offset: 0,
            length: 0,
        }
    }

    /// Resolves `span` against `source`.
    #[must_use]
    pub fn from_span(file: PathBuf, source: &str, index: &LineIndex, span: Span) -> Self {
        let start = index.position(source, span.start);
        let end = index.position(source, span.end);
        Self {
            file,
            line: start.line,
            column: start.column,
            end_line: end.line,
            end_column: end.column,
            offset: span.start,
            length: span.len(),
        }
    }

    /// Byte span of this location.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.length)
    }
}

/// A located, categorised lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where the finding is.
    pub location: Location,
    /// Rule code (e.g., "SW301").
    pub code: String,
    /// Rule name (e.g., "force-unwrap").
    pub rule: String,
    /// Rule category.
    pub category: Category,
    /// Effective severity after configuration overrides.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Suggestion text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Automatic edit carried by the finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<TextEdit>,
    /// Whether an automatic edit is available.
    pub fixable: bool,
    /// Whether the edit was applied by autofix.
    #[serde(default)]
    pub fix_applied: bool,
}

impl Diagnostic {
    /// Builds a diagnostic from a rule violation.
    #[must_use]
    pub fn from_violation(violation: Violation, category: Category, location: Location) -> Self {
        let (help, edit) = match violation.suggestion {
            Some(Suggestion { message, edit }) => (Some(message), edit),
            None => (None, None),
        };
        Self {
            location,
            code: violation.code,
            rule: violation.rule,
            category,
            severity: violation.severity,
            message: violation.message,
            fixable: edit.is_some(),
            help,
            edit,
            fix_applied: false,
        }
    }

    /// Byte span of the finding.
    #[must_use]
    pub fn span(&self) -> Span {
        self.location.span()
    }

    /// Canonical ordering key: start offset, code, end offset, message.
    #[must_use]
    pub fn sort_key(&self) -> (usize, &str, usize, &str) {
        let span = self.span();
        (span.start, &self.code, span.end, &self.message)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )?;
        if self.fix_applied {
            write!(f, " (fixed)")?;
        }
        Ok(())
    }
}

/// Converts a [`Diagnostic`] to a miette diagnostic for rich display.
#[derive(Debug, thiserror::Error, MietteDiagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Diagnostic> for ViolationDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        Self {
            message: format!("[{}] {}", d.code, d.message),
            help: d.help.clone(),
            span: SourceSpan::from((d.location.offset, d.location.length)),
            label_message: d.rule.clone(),
        }
    }
}

/// Result of linting a set of files.
///
/// Diagnostics with `fix_applied` set record edits autofix already made;
/// counts and threshold checks skip them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All diagnostics found, grouped by file in input order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics still present in the checked sources.
    pub fn outstanding(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.fix_applied)
    }

    /// Number of diagnostics whose edit was applied.
    #[must_use]
    pub fn fixed_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.fix_applied).count()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Returns true if there are any warnings or errors.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.has_violations_at(Severity::Warning)
    }

    /// Counts outstanding diagnostics by severity as
    /// `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.outstanding()
            .fold((0, 0, 0), |(e, w, i), d| match d.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Checks if any outstanding diagnostic meets or exceeds the given
    /// severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.outstanding().any(|d| d.severity >= severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(severity: Severity) -> Diagnostic {
        let violation = Violation::new(
            "SW301",
            "force-unwrap",
            severity,
            Span::new(4, 6),
            "force unwrap of 'x'",
        );
        let location = Location::from_span(
            PathBuf::from("Sources/App.swift"),
            "let x!\n",
            &LineIndex::new("let x!\n"),
            violation.span,
        );
        Diagnostic::from_violation(violation, Category::Optionals, location)
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
        assert!(Severity::Info < Severity::Warning);
    }

    #[test]
    fn display_is_compact() {
        let d = make_diagnostic(Severity::Warning);
        assert_eq!(
            d.to_string(),
            "Sources/App.swift:1:5: warning [SW301] force unwrap of 'x'"
        );
        assert_eq!((d.location.end_line, d.location.end_column), (1, 7));
    }

    #[test]
    fn fixable_follows_edit() {
        let violation = Violation::new("SW105", "trailing-whitespace", Severity::Info, Span::new(0, 1), "m")
            .with_suggestion(Suggestion::with_fix("remove", TextEdit::delete(Span::new(0, 1))));
        let d = Diagnostic::from_violation(
            violation,
            Category::Layout,
            Location::new(PathBuf::from("a.swift"), 1, 1),
        );
        assert!(d.fixable);
        assert_eq!(d.help.as_deref(), Some("remove"));
    }

    #[test]
    fn category_serialises_kebab_case() {
        let json = serde_json::to_string(&Category::ControlFlow).unwrap_or_default();
        assert_eq!(json, "\"control-flow\"");
    }

    #[test]
    fn has_violations_at_threshold() {
        let mut result = LintResult::new();
        result.diagnostics.push(make_diagnostic(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
        assert!(result.has_warnings());
        assert!(!result.has_errors());
    }

    #[test]
    fn fixed_diagnostics_are_not_outstanding() {
        let mut fixed = make_diagnostic(Severity::Error);
        fixed.fix_applied = true;
        let mut result = LintResult::new();
        result.diagnostics.push(fixed);
        result.diagnostics.push(make_diagnostic(Severity::Info));

        assert_eq!(result.fixed_count(), 1);
        assert_eq!(result.count_by_severity(), (0, 0, 1));
        assert!(!result.has_errors());
        assert!(result.diagnostics[0].to_string().ends_with("(fixed)"));
    }
}
