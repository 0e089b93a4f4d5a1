//! List rules command implementation.

use swift_style::rules::{all_rules, Preset};
use swift_style::ENGINE_CODES;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<30} {:<14} Description", "Code", "Name", "Category");
    println!("{}", "-".repeat(96));

    for rule in all_rules() {
        println!(
            "{:<8} {:<30} {:<14} {}",
            rule.code(),
            rule.name(),
            rule.category().as_str(),
            rule.description()
        );
    }

    println!("\nEngine diagnostics (always on):");
    for engine in ENGINE_CODES {
        println!(
            "  {:<6} {:<24} {}",
            engine.code, engine.name, engine.description
        );
    }

    println!("\nPresets:");
    for preset in Preset::ALL {
        let marker = if preset == Preset::default() {
            " (default)"
        } else {
            ""
        };
        println!(
            "  {:<12} - {} rules{marker}",
            preset.name(),
            preset.rules().len()
        );
    }

    println!("\nUse --rules to run only some rules, e.g.:");
    println!("  swift-style check --rules force-unwrap,trailing-closure");
    println!("  swift-style check --rules SW101,SW201");
}
