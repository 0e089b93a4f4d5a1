//! Shared output formatting for lint results.

use anyhow::Result;
use serde::Serialize;
use swift_style::{Diagnostic, LintResult, Severity, SourceInput, ViolationDiagnostic};

use crate::OutputFormat;

/// Print lint results in the specified format. `sources` supplies the text
/// the diagnostics point into; only `pretty` reads it. Applied fixes point
/// into text that no longer exists, so they are printed without a snippet.
pub fn print(result: &LintResult, format: OutputFormat, sources: &[SourceInput]) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, sources),
    }
    Ok(())
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    let fixed = result.fixed_count();
    if fixed > 0 {
        println!("\x1b[32mFixed {fixed} issue(s)\x1b[0m");
    }
}

fn print_text(result: &LintResult) {
    for d in &result.diagnostics {
        let fixable = if d.fix_applied {
            " (fixed)"
        } else if d.fixable {
            " (fixable)"
        } else {
            ""
        };
        println!(
            "{} {} at {}:{}:{}{}",
            d.code,
            d.rule,
            d.location.file.display(),
            d.location.line,
            d.location.column,
            fixable,
        );
        println!("  {}: {}", severity_indicator(d.severity), d.message);
        if let Some(help) = &d.help {
            println!("  = help: {help}");
        }
        println!();
    }
    print_summary(result);
}

/// JSON document written by `--format json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    files_checked: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
    fixed: usize,
    diagnostics: &'a [Diagnostic],
}

fn json_report(result: &LintResult) -> Result<String> {
    let (errors, warnings, infos) = result.count_by_severity();
    let report = JsonReport {
        files_checked: result.files_checked,
        errors,
        warnings,
        infos,
        fixed: result.fixed_count(),
        diagnostics: &result.diagnostics,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn print_json(result: &LintResult) -> Result<()> {
    println!("{}", json_report(result)?);
    Ok(())
}

fn print_compact(result: &LintResult) {
    for d in &result.diagnostics {
        println!("{d}");
    }
}

fn print_pretty(result: &LintResult, sources: &[SourceInput]) {
    for d in &result.diagnostics {
        if d.fix_applied {
            println!("{d}");
            continue;
        }
        let diagnostic = ViolationDiagnostic::from(d);
        match sources.iter().find(|s| s.path == d.location.file) {
            Some(input) => {
                let named = miette::NamedSource::new(
                    input.path.display().to_string(),
                    input.source.clone(),
                );
                let report = miette::Report::new(diagnostic).with_source_code(named);
                println!("{report:?}");
            }
            None => println!("{:?}", miette::Report::new(diagnostic)),
        }
    }
    print_summary(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use swift_style::{fix_source, lint_source, Config};

    #[test]
    fn json_report_carries_counts_and_diagnostics() {
        let diagnostics =
            lint_source(&Config::default(), Path::new("A.swift"), "let a = b!;\n").unwrap();
        let result = LintResult {
            diagnostics,
            files_checked: 1,
        };

        let value: serde_json::Value = serde_json::from_str(&json_report(&result).unwrap()).unwrap();
        assert_eq!(value["files_checked"], 1);
        assert_eq!(value["warnings"], 2);
        let codes: Vec<&str> = value["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["SW301", "SW106"]);
    }

    #[test]
    fn json_report_counts_fixes_apart() {
        let outcome =
            fix_source(&Config::default(), Path::new("A.swift"), "let a = b!;\n").unwrap();
        let result = LintResult {
            diagnostics: outcome.fixed.into_iter().chain(outcome.remaining).collect(),
            files_checked: 1,
        };

        let value: serde_json::Value = serde_json::from_str(&json_report(&result).unwrap()).unwrap();
        assert_eq!(value["fixed"], 1);
        assert_eq!(value["warnings"], 1);
        assert_eq!(value["diagnostics"][0]["code"], "SW106");
        assert_eq!(value["diagnostics"][0]["fix_applied"], true);
        assert_eq!(value["diagnostics"][1]["fix_applied"], false);
    }
}
