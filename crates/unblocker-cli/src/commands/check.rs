//! Check command - evaluate a bypass decision for one client

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use unblocker_core::{
    ClientIdentity, Decision, EntryKind, Gate, MacAddr, NoopResolver, ReverseResolver,
    SystemResolver,
};

use super::config::ActiveConfig;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Client IP address the query came from
    pub ip: IpAddr,

    /// Allowlist file (default: the configured one)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Client MAC address, as another stage would supply it
    #[arg(long, value_name = "MAC")]
    pub mac: Option<String>,

    /// Client hostname; skips the reverse lookup
    #[arg(long, value_name = "NAME")]
    pub hostname: Option<String>,

    /// Never fall back to a reverse DNS lookup
    #[arg(long)]
    pub no_reverse: bool,

    /// Reverse lookup timeout in milliseconds (0 = resolver default)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

/// Execute check command
pub fn execute(args: CheckArgs, active: &ActiveConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let (decision, matched) = runtime.block_on(evaluate(&args, active))?;
    print_outcome(&args, decision, matched);
    Ok(())
}

async fn evaluate(args: &CheckArgs, active: &ActiveConfig) -> Result<(Decision, Option<EntryKind>)> {
    let path = args
        .file
        .clone()
        .or_else(|| active.allowlist_path());

    let reverse = active.config.resolver.reverse_lookup && !args.no_reverse;
    let resolver: Arc<dyn ReverseResolver> = if reverse {
        Arc::new(SystemResolver::new())
    } else {
        Arc::new(NoopResolver)
    };

    let mut gate = Gate::new(path.as_deref(), resolver)
        .with_context(|| match &path {
            Some(path) => format!("Failed to load allowlist {}", path.display()),
            None => "Failed to build gate".to_string(),
        })?;

    let timeout = match args.timeout_ms {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => active.config.lookup_timeout(),
    };
    if let Some(timeout) = timeout {
        gate = gate.with_lookup_timeout(timeout);
    }

    if !gate.is_enabled() {
        warn!("No allowlist configured, every client continues to blocking");
    }

    let mut identity = ClientIdentity::new(args.ip);
    if let Some(mac) = &args.mac {
        if !MacAddr::is_mac(mac) {
            warn!(%mac, "MAC does not look like a MAC literal, it can never match");
        }
        identity = identity.with_mac(mac.as_str());
    }
    if let Some(hostname) = &args.hostname {
        identity = identity.with_hostname(hostname.as_str());
    }

    let matched = gate.evaluate(&identity, None).await;
    let decision = Decision::from(matched.is_some());
    info!(client = %args.ip, ?decision, "Evaluated client");

    Ok((decision, matched))
}

fn print_outcome(args: &CheckArgs, decision: Decision, matched: Option<EntryKind>) {
    println!("Client: {}", args.ip.to_string().cyan());
    if let Some(mac) = &args.mac {
        println!("MAC: {}", mac);
    }
    if let Some(hostname) = &args.hostname {
        println!("Hostname: {}", hostname);
    }

    match (decision, matched) {
        (Decision::Bypass, Some(kind)) => {
            println!("Decision: {} (matched {})", "BYPASS".green().bold(), kind);
        }
        _ => println!("Decision: {}", "CONTINUE".yellow().bold()),
    }
}
