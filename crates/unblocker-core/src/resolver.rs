//! Reverse DNS resolution
//!
//! The gate falls back to a PTR lookup when no stage supplied a hostname.
//! Lookups go through [`ReverseResolver`] so hosts can substitute their own
//! mechanism, or disable lookups entirely with [`NoopResolver`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use tracing::{debug, warn};

/// Capability to resolve an address back to hostnames
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReverseResolver: Send + Sync {
    /// Resolve PTR names for `ip`
    ///
    /// Names are returned in textual form and may carry the trailing root
    /// dot. An empty list means the address has no name.
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>>;
}

/// Resolver backed by the system's DNS configuration
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Build from `/etc/resolv.conf` (or the platform equivalent)
    ///
    /// Falls back to the library's default upstreams when the system
    /// configuration cannot be read.
    pub fn new() -> Self {
        let inner = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!(error = %e, "Failed to read system resolver configuration, using defaults");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { inner }
    }

    /// Build with explicit upstream configuration
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReverseResolver for SystemResolver {
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>> {
        let lookup = self
            .inner
            .reverse_lookup(ip)
            .await
            .map_err(|e| Error::reverse_lookup(ip, e))?;

        let names: Vec<String> = lookup.iter().map(|ptr| ptr.to_string()).collect();
        debug!(%ip, count = names.len(), "reverse lookup");
        Ok(names)
    }
}

/// Resolver that never knows any names
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResolver;

#[async_trait]
impl ReverseResolver for NoopResolver {
    async fn reverse_lookup(&self, _ip: IpAddr) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Pick the hostname a gate should match from PTR results
///
/// Uses the first name with a single trailing root dot removed.
pub fn primary_name(names: &[String]) -> Option<&str> {
    names.first().map(|name| name.strip_suffix('.').unwrap_or(name))
}
