//! Config command - configuration management

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unblocker_core::{AllowSets, Config};

/// File name looked up in the working and user config directories
const CONFIG_FILE_NAME: &str = "unblocker.toml";

/// Configuration in effect for this invocation
#[derive(Debug, Default)]
pub struct ActiveConfig {
    /// File the configuration came from, `None` for built-in defaults
    pub path: Option<PathBuf>,
    /// Parsed and validated configuration
    pub config: Config,
}

impl ActiveConfig {
    /// Load the explicit file, else the first one found on the search path,
    /// else fall back to defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        let config = load_validated(&path)?;
        Ok(Self {
            path: Some(path),
            config,
        })
    }

    /// Allowlist path from the configuration
    ///
    /// A relative path is taken relative to the directory of the config
    /// file it came from.
    pub fn allowlist_path(&self) -> Option<PathBuf> {
        let path = self.config.allowlist.path.as_deref()?;
        Some(relative_to_config(self.path.as_deref(), path))
    }
}

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Config file to show (default: detect)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,

        /// Allowlist file to reference
        #[arg(short, long, value_name = "FILE")]
        allowlist: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file and the allowlist it names
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs, active: &ActiveConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show { file } => show_config(file, active),
        ConfigAction::Generate {
            output,
            allowlist,
            force,
        } => generate_config(output, allowlist, force),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Paths => show_paths(),
    }
}

fn show_config(file: Option<PathBuf>, active: &ActiveConfig) -> Result<()> {
    let (source, config) = match file {
        Some(path) => {
            let config = load_validated(&path)?;
            (Some(path), config)
        }
        None => (active.path.clone(), active.config.clone()),
    };

    match source {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# Built-in defaults"),
    }

    let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: PathBuf, allowlist: Option<PathBuf>, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "Refusing to overwrite {}; pass --force to replace it",
            output.display()
        );
    }

    let mut config = Config::default();
    config.allowlist.path = allowlist;

    let toml_str = config.to_toml().context("Failed to serialize config")?;

    // Add header comment
    let content = format!(
        "# Unblocker configuration\n\
         # Omit [allowlist] path to disable the gate.\n\
         # Allowlist lines are IP literals, MAC literals or hostnames; # starts a comment.\n\n\
         {}",
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "Generated config file");
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = load_validated(&file)?;

    println!("{} Configuration is valid", "✓".green());
    println!(
        "  Reverse lookup: {}",
        if config.resolver.reverse_lookup { "enabled" } else { "disabled" }
    );
    match config.lookup_timeout() {
        Some(timeout) => println!("  Lookup timeout: {} ms", timeout.as_millis()),
        None => println!("  Lookup timeout: resolver default"),
    }

    let allowlist = config
        .allowlist
        .path
        .as_deref()
        .map(|path| relative_to_config(Some(&file), path));
    match &allowlist {
        Some(path) => {
            let (sets, report) = AllowSets::load_with_report(path)
                .with_context(|| format!("Allowlist named by {} is unusable", file.display()))?;
            println!("  Allowlist: {}", path.display());
            println!(
                "    {} IPs, {} MACs, {} hostnames ({} lines)",
                sets.ips().len(),
                sets.macs().len(),
                sets.names().len(),
                report.lines
            );
        }
        None => println!("  Allowlist: {}", "none (gate disabled)".yellow()),
    }

    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();

    for (idx, path) in search_paths().iter().enumerate() {
        let marker = if path.exists() { " (found)".green().to_string() } else { String::new() };
        println!("  {}. {}{}", idx + 1, path.display(), marker);
    }

    println!();
    println!("Override with -c/--config or the UNBLOCKER_CONFIG environment variable.");

    Ok(())
}

fn relative_to_config(config_file: Option<&Path>, path: &Path) -> PathBuf {
    match config_file.and_then(Path::parent) {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn load_validated(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Configuration validation failed: {}", path.display()))?;
    Ok(config)
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

    if let Some(dirs) = directories::ProjectDirs::from("", "", "unblocker") {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }

    paths
}

fn find_config_file() -> Option<PathBuf> {
    let found = search_paths().into_iter().find(|path| path.exists());
    if let Some(path) = &found {
        debug!(path = %path.display(), "Found config file");
    }
    found
}
