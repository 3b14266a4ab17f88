//! # Unblocker Core
//!
//! Allowlist gate for DNS blocking pipelines.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Allowlist loading** - Flat text file classified into IP, MAC and hostname sets
//! - **Bypass decisions** - Per-request matching with metadata and reverse DNS fallback
//! - **Host seams** - Traits for request metadata and reverse resolution
//! - **Configuration** - TOML configuration for the gate
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use unblocker_core::{Decision, Gate, Metadata, SystemResolver};
//!
//! # async fn handle() -> unblocker_core::Result<()> {
//! let gate = Gate::new(
//!     Some(Path::new("/etc/unblocker/allowlist.txt")),
//!     Arc::new(SystemResolver::new()),
//! )?;
//!
//! let metadata = Metadata::new().with_mac("aa:bb:cc:dd:ee:ff");
//! if gate.decide("192.168.1.20".parse().unwrap(), &metadata).await == Decision::Bypass {
//!     // hand the query to the stage after the blocker
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod allowlist;
pub mod config;
pub mod error;
pub mod gate;
pub mod mac;
pub mod metadata;
pub mod resolver;

// Re-exports for convenience
pub use allowlist::{AllowSets, Entry, EntryKind, LoadReport};
pub use config::Config;
pub use error::{Error, Result};
pub use gate::{ClientIdentity, Decision, Gate};
pub use mac::MacAddr;
pub use metadata::{Metadata, RequestMetadata, HOSTNAME_KEY, MAC_KEY};
pub use resolver::{NoopResolver, ReverseResolver, SystemResolver};
