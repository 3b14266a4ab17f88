//! Unblocker CLI
//!
//! Operator tool for inspecting client allowlists and evaluating bypass
//! decisions outside the DNS pipeline.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;
use commands::config::{ActiveConfig, ConfigAction};
use commands::Command;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Only commands that act on the configured gate read a config file, so a
    // broken one cannot get in the way of completions or config repair
    let active = if uses_active_config(&args) {
        ActiveConfig::resolve(args.config.as_deref())?
    } else {
        ActiveConfig::default()
    };

    // Initialize logging
    logging::init(&args, &active.config.logging)?;

    let result = run(args, &active);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

/// Whether the command depends on the configuration in effect
fn uses_active_config(args: &Args) -> bool {
    match &args.command {
        Command::List(_) | Command::Check(_) => true,
        Command::Config(config_args) => matches!(config_args.action, ConfigAction::Show { file: None }),
        Command::Completions(_) => false,
    }
}

fn run(args: Args, active: &ActiveConfig) -> Result<()> {
    match args.command {
        Command::List(list_args) => commands::list::execute(list_args, active),
        Command::Check(check_args) => commands::check::execute(check_args, active),
        Command::Config(config_args) => commands::config::execute(config_args, active),
        Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}
