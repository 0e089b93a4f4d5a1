//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "swift-style.toml";

const DEFAULT_CONFIG: &str = r#"# swift-style configuration

# recommended (default), strict or minimal
preset = "recommended"

# Exit with status 1 when a diagnostic reaches this severity
fail_on = "error"

[files]
exclude = [
    "**/.build/**",
    "**/Pods/**",
]
respect_gitignore = true
# parallelism = 4

[lint]
indent_width = 2
max_autofix_retries = 3
suppression_marker = "swift-style: allow"
# Run only these rules (names or codes)
# enabled_rules = ["trailing-closure", "SW101"]

# Per-rule overrides: enabled, severity and rule options

[rules.force-unwrap]
# severity = "error"
allow_in_tests = true

# [rules.acronym-casing]
# acronyms = ["ID", "URL", "HTTP"]

# [rules.trailing-whitespace]
# enabled = false
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("."), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: swift-style check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
