//! # swift-style-rules
//!
//! Built-in style rules for swift-style.
//!
//! ## Available Rules
//!
//! | Code | Name | Category | Fix |
//! |------|------|----------|-----|
//! | SW101 | `redundant-parentheses` | layout | yes |
//! | SW102 | `no-tab-indentation` | layout | yes |
//! | SW103 | `brace-style` | layout | yes |
//! | SW104 | `punctuation-spacing` | layout | yes |
//! | SW105 | `trailing-whitespace` | layout | yes |
//! | SW106 | `no-semicolons` | layout | yes |
//! | SW201 | `trailing-closure` | closures | yes |
//! | SW301 | `force-unwrap` | optionals | no |
//! | SW302 | `implicitly-unwrapped-optional` | optionals | no |
//! | SW303 | `case-pattern-binding` | optionals | yes |
//! | SW401 | `empty-case-body` | control-flow | no |
//! | SW402 | `fallthrough-only-case` | control-flow | no |
//! | SW501 | `type-name-casing` | naming | yes |
//! | SW502 | `value-name-casing` | naming | yes |
//! | SW503 | `acronym-casing` | naming | yes |
//! | SW601 | `modifier-order` | modifiers | yes |
//!
//! ## Usage
//!
//! ```
//! use std::path::Path;
//! use swift_style_core::Linter;
//! use swift_style_rules::{ForceUnwrap, NoSemicolons};
//!
//! let linter = Linter::builder()
//!     .rule(NoSemicolons::new())
//!     .rule(ForceUnwrap::new().allow_in_tests(false))
//!     .build()?;
//! let diagnostics = linter.lint(Path::new("Sources/Main.swift"), "let x = y!;\n");
//! assert_eq!(diagnostics.len(), 2);
//! # Ok::<(), swift_style_core::LinterError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod acronym_casing;
pub mod brace_style;
pub mod case_pattern_binding;
pub mod empty_case_body;
pub mod fallthrough_only_case;
pub mod force_unwrap;
pub mod implicitly_unwrapped_optional;
pub mod modifier_order;
pub mod no_semicolons;
pub mod no_tab_indentation;
mod presets;
pub mod punctuation_spacing;
pub mod redundant_parentheses;
pub mod trailing_closure;
pub mod trailing_whitespace;
pub mod type_name_casing;
mod utils;
pub mod value_name_casing;

pub use acronym_casing::AcronymCasing;
pub use brace_style::BraceStyle;
pub use case_pattern_binding::CasePatternBinding;
pub use empty_case_body::EmptyCaseBody;
pub use fallthrough_only_case::FallthroughOnlyCase;
pub use force_unwrap::ForceUnwrap;
pub use implicitly_unwrapped_optional::ImplicitlyUnwrappedOptional;
pub use modifier_order::ModifierOrder;
pub use no_semicolons::NoSemicolons;
pub use no_tab_indentation::NoTabIndentation;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use punctuation_spacing::PunctuationSpacing;
pub use redundant_parentheses::RedundantParentheses;
pub use trailing_closure::TrailingClosure;
pub use trailing_whitespace::TrailingWhitespace;
pub use type_name_casing::TypeNameCasing;
pub use value_name_casing::ValueNameCasing;

/// Re-export core types for convenience.
pub use swift_style_core::{Rule, Severity, Violation};
