//! Configuration management for the unblocker gate
//!
//! Strongly-typed TOML configuration. Every field has a default so a
//! minimal file (or none at all) is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest reverse lookup timeout accepted
const MAX_LOOKUP_TIMEOUT_MS: u64 = 60_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allowlist source
    pub allowlist: AllowlistConfig,

    /// Reverse DNS settings
    pub resolver: ResolverConfig,

    /// Logging defaults for the CLI
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(Error::from)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.allowlist.path {
            if path.as_os_str().is_empty() {
                return Err(Error::config_value(
                    "allowlist.path",
                    "must not be empty; omit the key to disable the gate",
                ));
            }
        }

        if self.resolver.timeout_ms > MAX_LOOKUP_TIMEOUT_MS {
            return Err(Error::config_value(
                "resolver.timeout_ms",
                format!("must be at most {MAX_LOOKUP_TIMEOUT_MS}"),
            ));
        }

        match self.logging.format.as_str() {
            "text" | "json" | "compact" => {}
            other => {
                return Err(Error::config_value(
                    "logging.format",
                    format!("unknown format '{other}', expected text, json or compact"),
                ));
            }
        }

        Ok(())
    }

    /// Per-lookup timeout, `None` when the resolver's own timeouts apply
    pub fn lookup_timeout(&self) -> Option<Duration> {
        match self.resolver.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Allowlist source configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowlistConfig {
    /// Allowlist file; absent disables the gate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Reverse DNS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Fall back to PTR lookups when no hostname is supplied
    pub reverse_lookup: bool,
    /// Upper bound per lookup in milliseconds (0 = resolver default)
    pub timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reverse_lookup: true,
            timeout_ms: 2000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    pub level: String,
    /// Output format: text, json or compact
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
