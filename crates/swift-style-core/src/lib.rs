//! # swift-style-core
//!
//! Core of the swift-style linter.
//!
//! This crate provides everything between a source buffer and a sorted list
//! of diagnostics:
//!
//! - [`lexer`]: lossless tokenizer with nested string interpolation
//! - [`syntax`]: fault-tolerant recursive-descent tree builder
//! - [`Rule`] trait and [`RuleRegistry`] for node-kind dispatch
//! - [`Linter`] for running rules, suppression and severity overrides
//! - [`autofix`] for conflict-free edit application to a fixed point
//!
//! The core never touches the file system; callers hand it buffers.
//!
//! ## Engine codes
//!
//! | Code | Name | Severity |
//! |------|------|----------|
//! | SW001 | `unterminated-literal` | Error |
//! | SW002 | `syntax-error` | Warning |
//! | SW003 | `internal-rule-error` | Error |
//! | SW004 | `invalid-suppression` | Info |
//!
//! ## Example
//!
//! ```
//! use std::path::Path;
//! use swift_style_core::Linter;
//!
//! let linter = Linter::builder().build()?;
//! let diagnostics = linter.lint(Path::new("a.swift"), "let s = \"open");
//! assert!(diagnostics.iter().any(|d| d.code == "SW001"));
//! # Ok::<(), swift_style_core::LinterError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod autofix;
mod config;
mod context;
mod engine;
pub mod lexer;
mod registry;
mod rule;
pub mod span;
pub mod suppression;
pub mod syntax;
pub mod token;
mod types;

pub use autofix::{apply_edits, EditOutcome, FixOutcome};
pub use config::{
    Config, ConfigError, FilesConfig, LintConfig, RuleConfig, DEFAULT_SUPPRESSION_MARKER,
};
pub use context::RuleContext;
pub use engine::{
    EngineCode, Linter, LinterBuilder, LinterError, SourceInput, ENGINE_CODES,
    INTERNAL_RULE_ERROR, INVALID_SUPPRESSION, SYNTAX_ERROR, UNTERMINATED_LITERAL,
};
pub use registry::RuleRegistry;
pub use rule::{Rule, RuleBox};
pub use span::{LineIndex, Position, Span};
pub use syntax::{NodeKind, NodeRef, SyntaxTree};
pub use token::{Token, TokenKind};
pub use types::{
    Category, Diagnostic, LintResult, Location, Severity, Suggestion, TextEdit, Violation,
    ViolationDiagnostic,
};
