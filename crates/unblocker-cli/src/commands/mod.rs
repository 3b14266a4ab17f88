//! CLI commands

pub mod check;
pub mod completions;
pub mod config;
pub mod list;

use clap::Subcommand;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the entries of an allowlist file
    List(list::ListArgs),

    /// Evaluate the bypass decision for a client
    Check(check::CheckArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
