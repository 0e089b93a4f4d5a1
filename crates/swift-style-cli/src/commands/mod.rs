//! Subcommand implementations.

pub mod check;
pub mod files;
pub mod init;
pub mod list_rules;
pub mod output;
