//! List command - show what an allowlist file contains

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use unblocker_core::{AllowSets, LoadReport};

use super::config::ActiveConfig;

/// List command arguments
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Allowlist file (default: the configured one)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute list command
pub fn execute(args: ListArgs, active: &ActiveConfig) -> Result<()> {
    let path = args
        .file
        .or_else(|| active.allowlist_path())
        .context("No allowlist file given; pass --file or set [allowlist] path in the config")?;

    let (sets, report) = AllowSets::load_with_report(&path)
        .with_context(|| format!("Failed to load allowlist {}", path.display()))?;

    println!("{}", "═".repeat(50).bright_blue());
    println!("{}", " Client Allowlist".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("File: {}", path.display().to_string().cyan());
    print_report(&report);
    println!("{}", "─".repeat(50).bright_black());

    print_group("IP addresses", &sets.ips());
    print_group("MAC addresses", &sets.macs());
    print_group("Hostnames", &sets.names());

    println!("{}", "═".repeat(50).bright_blue());

    Ok(())
}

fn print_report(report: &LoadReport) {
    println!(
        "Lines: {}  (entries {}, skipped {})",
        report.lines,
        report.entries().to_string().green(),
        report.skipped
    );
}

fn print_group(title: &str, values: &[&str]) {
    println!("{} ({})", title.bold(), values.len());
    if values.is_empty() {
        println!("{}", "  (none)".dimmed());
    }
    for value in values {
        println!("  {} {}", "●".green(), value);
    }
}
