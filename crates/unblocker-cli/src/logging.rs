//! Logging initialization

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unblocker_core::config::LoggingConfig;

use crate::args::{Args, LogFormat};

/// Initialize logging based on CLI arguments and configured defaults
///
/// Flags win over the configuration file; `RUST_LOG` wins over both.
pub fn init(args: &Args, defaults: &LoggingConfig) -> Result<()> {
    let level = level_for(args, defaults)?;
    let format = format_for(args, defaults);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let log_file = args.log_file.as_deref().map(open_log_file).transpose()?;

    // Console output goes to stderr so command output stays clean on stdout
    match format {
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(args.verbose >= 2)
                    .with_thread_ids(args.verbose >= 3)
                    .with_file(args.verbose >= 3)
                    .with_line_number(args.verbose >= 3),
            );
            let file_layer = log_file.map(|file| fmt::layer().with_ansi(false).with_writer(file));
            subscriber.with(file_layer).init();
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));
            let file_layer = log_file.map(|file| fmt::layer().json().with_writer(file));
            subscriber.with(file_layer).init();
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr));
            let file_layer =
                log_file.map(|file| fmt::layer().compact().with_ansi(false).with_writer(file));
            subscriber.with(file_layer).init();
        }
    }

    Ok(())
}

/// Default level filter for this invocation
fn level_for(args: &Args, defaults: &LoggingConfig) -> Result<Level> {
    if args.quiet {
        return Ok(Level::ERROR);
    }

    match args.verbose {
        0 => defaults
            .level
            .parse::<Level>()
            .with_context(|| format!("Invalid log level in configuration: {}", defaults.level)),
        1 => Ok(Level::DEBUG),
        _ => Ok(Level::TRACE),
    }
}

fn format_for(args: &Args, defaults: &LoggingConfig) -> LogFormat {
    args.log_format
        .or_else(|| LogFormat::from_name(&defaults.format))
        .unwrap_or(LogFormat::Text)
}

fn open_log_file(path: &Path) -> Result<Mutex<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    Ok(Mutex::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["unblocker"];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["config", "paths"]);
        Args::parse_from(argv)
    }

    #[test]
    fn test_level_from_flags() {
        let defaults = LoggingConfig::default();
        assert_eq!(level_for(&args(&[]), &defaults).unwrap(), Level::INFO);
        assert_eq!(level_for(&args(&["-v"]), &defaults).unwrap(), Level::DEBUG);
        assert_eq!(level_for(&args(&["-vv"]), &defaults).unwrap(), Level::TRACE);
        assert_eq!(level_for(&args(&["-q"]), &defaults).unwrap(), Level::ERROR);
    }

    #[test]
    fn test_level_from_config() {
        let defaults = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(level_for(&args(&[]), &defaults).unwrap(), Level::WARN);

        let bad = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(level_for(&args(&[]), &bad).is_err());
    }

    #[test]
    fn test_format_flag_overrides_config() {
        let defaults = LoggingConfig {
            format: "json".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(format_for(&args(&[]), &defaults), LogFormat::Json);
        assert_eq!(
            format_for(&args(&["--log-format", "compact"]), &defaults),
            LogFormat::Compact
        );
    }
}
