//! Error types for unblocker-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.

use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for unblocker-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Allowlist file could not be opened
    #[error("failed to open allowlist file {}: {source}", path.display())]
    AllowlistOpen {
        /// Path to the allowlist file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Allowlist file failed part-way through the scan
    #[error("error reading allowlist file {} at line {line}: {source}", path.display())]
    AllowlistRead {
        /// Path to the allowlist file
        path: PathBuf,
        /// 1-based line number that failed to read
        line: usize,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reverse DNS lookup failed
    #[error("reverse lookup failed for {ip}: {reason}")]
    ReverseLookup {
        /// Address that was looked up
        ip: IpAddr,
        /// Failure reason
        reason: String,
    },

    /// Not a 48-bit MAC address literal
    #[error("invalid MAC address: {input}")]
    InvalidMac {
        /// The rejected input
        input: String,
    },

    /// Configuration file not found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a reverse lookup error
    pub fn reverse_lookup(ip: IpAddr, reason: impl ToString) -> Self {
        Self::ReverseLookup {
            ip,
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort gate construction
    ///
    /// Only resolution failures are tolerated while deciding.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ReverseLookup { .. })
    }
}
