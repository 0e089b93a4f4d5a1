//! # swift-style
//!
//! Rule-based style linter for Swift source, with autofix.
//!
//! This is the facade crate: it re-exports the core engine and the built-in
//! rules, and builds a linter from a [`Config`].
//!
//! ## Quick Start
//!
//! ```
//! use std::path::Path;
//! use swift_style::{fix_source, lint_source, Config};
//!
//! let config = Config::default();
//! let path = Path::new("Sources/App/Main.swift");
//!
//! let diagnostics = lint_source(&config, path, "if (x == 5) { foo() }\n")?;
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].code, "SW101");
//!
//! let outcome = fix_source(&config, path, "if (x == 5) { foo() }\n")?;
//! assert_eq!(outcome.output, "if x == 5 { foo() }\n");
//! # Ok::<(), swift_style::SetupError>(())
//! ```
//!
//! ## Suppression
//!
//! A comment naming rules (or none, for all) silences the next statement,
//! or the statement it trails:
//!
//! ```text
//! // swift-style: allow(force-unwrap) reason="bundled resource"
//! let url = Bundle.main.url(forResource: "config", withExtension: "json")!
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! preset = "strict"
//! fail_on = "warning"
//!
//! [lint]
//! indent_width = 4
//!
//! [rules.acronym-casing]
//! acronyms = ["URL", "ID", "SDK"]
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

// Re-export core types and traits
pub use swift_style_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use swift_style_rules::*;
}

mod runner;

pub use runner::{build_registry, linter_from_config, resolve_fail_on, resolve_preset, SetupError};

/// Lints one buffer with the linter `config` describes.
///
/// # Errors
///
/// Returns an error only if the configuration cannot produce a linter.
pub fn lint_source(config: &Config, path: &Path, source: &str) -> Result<Vec<Diagnostic>, SetupError> {
    let linter = linter_from_config(config.clone())?;
    Ok(linter.lint(path, source))
}

/// Applies autofixes to one buffer until it reaches a fixed point or the
/// pass limit.
///
/// # Errors
///
/// Returns an error only if the configuration cannot produce a linter.
pub fn fix_source(config: &Config, path: &Path, source: &str) -> Result<FixOutcome, SetupError> {
    let linter = linter_from_config(config.clone())?;
    Ok(linter.fix(path, source))
}
