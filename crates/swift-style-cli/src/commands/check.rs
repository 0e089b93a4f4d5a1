//! Check command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use swift_style::{linter_from_config, Config, LintResult, SourceInput};
use tracing::info;

use super::{files, output};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command line options of `check`.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Report format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes to run instead of the preset.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Rewrite files with autofixes.
    pub fix: bool,
}

/// Applies command line overrides on top of the loaded configuration.
fn apply_options(mut config: Config, options: &CheckOptions) -> Config {
    if let Some(filter) = &options.rules {
        let ids: Vec<String> = filter
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        config.lint.enabled_rules = Some(ids);
    }
    config.files.exclude.extend(options.exclude.iter().cloned());
    config
}

/// Runs the check command. Returns `true` when a diagnostic meets the
/// `fail_on` threshold.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a file cannot be
/// read or written.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let config = apply_options(source.load()?, options);
    let discovered = files::discover(path, &config.files)?;
    let linter = linter_from_config(config).context("Failed to build linter")?;

    let mut inputs = discovered
        .into_iter()
        .map(|file| {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            Ok(SourceInput::new(file, text))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Checking {} file(s) in {} with {} rules",
        inputs.len(),
        path.display(),
        linter.rule_count()
    );

    let result = if options.fix {
        fix_files(&linter, &mut inputs)?
    } else {
        linter.lint_all(&inputs)
    };

    output::print(&result, options.format, &inputs)?;
    Ok(linter.fails(&result.diagnostics))
}

/// Fixes every input on disk and in memory. The report lists the applied
/// fixes of each file followed by what remains.
fn fix_files(linter: &swift_style::Linter, inputs: &mut [SourceInput]) -> Result<LintResult> {
    let mut result = LintResult::new();
    let mut rewritten = 0usize;
    for input in inputs {
        let outcome = linter.fix(&input.path, &input.source);
        if outcome.output != input.source {
            std::fs::write(&input.path, &outcome.output)
                .with_context(|| format!("Failed to write {}", input.path.display()))?;
            rewritten += 1;
        }
        input.source = outcome.output;
        result.files_checked += 1;
        result.diagnostics.extend(outcome.fixed);
        result.diagnostics.extend(outcome.remaining);
    }
    info!(
        fixed = result.fixed_count(),
        "Rewrote {rewritten} file(s)"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(format: OutputFormat) -> CheckOptions {
        CheckOptions {
            format,
            ..CheckOptions::default()
        }
    }

    #[test]
    fn rules_filter_becomes_allow_list() {
        let opts = CheckOptions {
            rules: Some("force-unwrap, SW101,".to_string()),
            exclude: vec!["**/Generated/**".to_string()],
            ..CheckOptions::default()
        };
        let config = apply_options(Config::default(), &opts);
        assert_eq!(
            config.lint.enabled_rules,
            Some(vec!["force-unwrap".to_string(), "SW101".to_string()])
        );
        assert!(config.files.exclude.contains(&"**/Generated/**".to_string()));
    }

    #[test]
    fn fails_only_at_threshold() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Main.swift"), "let v = value!\n").unwrap();

        let failed = run(
            tmp.path(),
            &options(OutputFormat::Compact),
            &ConfigSource::Default,
        )
        .unwrap();
        assert!(!failed);

        let config = tmp.path().join("strict.toml");
        fs::write(&config, "fail_on = \"warning\"\n").unwrap();
        let failed = run(
            tmp.path(),
            &options(OutputFormat::Compact),
            &ConfigSource::Explicit(config),
        )
        .unwrap();
        assert!(failed);
    }

    #[test]
    fn fix_rewrites_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Main.swift");
        fs::write(&file, "if (ready) { start() };\n").unwrap();

        let opts = CheckOptions {
            fix: true,
            ..options(OutputFormat::Compact)
        };
        let failed = run(tmp.path(), &opts, &ConfigSource::Default).unwrap();
        assert!(!failed);
        assert_eq!(fs::read_to_string(&file).unwrap(), "if ready { start() }\n");
    }

    #[test]
    fn fix_reports_applied_fixes_without_failing() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Main.swift");
        fs::write(&file, "if (ready) { start() };\nlet v = value!\n").unwrap();
        let linter = linter_from_config(Config::parse("fail_on = \"warning\"\n").unwrap()).unwrap();

        let mut inputs = vec![SourceInput::new(
            file.clone(),
            fs::read_to_string(&file).unwrap(),
        )];
        let result = fix_files(&linter, &mut inputs).unwrap();

        let fixed: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.fix_applied)
            .map(|d| d.code.as_str())
            .collect();
        assert_eq!(fixed, vec!["SW101", "SW106"]);
        let outstanding: Vec<_> = result.outstanding().map(|d| d.code.as_str()).collect();
        assert_eq!(outstanding, vec!["SW301"]);
        assert_eq!(result.count_by_severity(), (0, 1, 0));
        assert!(linter.fails(&result.diagnostics));

        fs::write(&file, "if (ready) { start() };\n").unwrap();
        inputs[0].source = fs::read_to_string(&file).unwrap();
        let result = fix_files(&linter, &mut inputs).unwrap();
        assert_eq!(result.fixed_count(), 2);
        assert!(!linter.fails(&result.diagnostics));
    }

    #[test]
    fn unknown_rule_in_filter_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let opts = CheckOptions {
            rules: Some("no-such-rule".to_string()),
            ..CheckOptions::default()
        };
        assert!(run(tmp.path(), &opts, &ConfigSource::Default).is_err());
    }
}
