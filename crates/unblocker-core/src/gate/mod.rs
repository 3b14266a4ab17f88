//! Bypass decision gate
//!
//! Decides per request whether the client is allowlisted. Checks run in a
//! fixed order and the first match wins:
//!
//! ```text
//! client IP  ──▶ exact text in allowed IPs?            ──▶ Bypass
//! MAC (meta) ──▶ lowercased, in allowed MACs?          ──▶ Bypass
//! hostname   ──▶ metadata, else PTR lookup of the IP,
//!                lowercased, in allowed names?         ──▶ Bypass
//!                                                      ──▶ Continue
//! ```
//!
//! A failed or empty PTR lookup only removes the hostname signal from that
//! one decision; it is never reported to the caller.

mod identity;

pub use identity::{ClientIdentity, Decision};

use crate::allowlist::{AllowSets, EntryKind};
use crate::config::Config;
use crate::error::Result;
use crate::metadata::RequestMetadata;
use crate::resolver::{primary_name, NoopResolver, ReverseResolver, SystemResolver};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Allowlist gate placed in front of a blocking stage
///
/// Immutable after construction and safe to share between concurrent
/// decisions.
pub struct Gate {
    /// `None` means no allowlist was configured and every decision is
    /// `Continue`
    allowlist: Option<AllowSets>,
    resolver: Arc<dyn ReverseResolver>,
    lookup_timeout: Option<Duration>,
}

impl Gate {
    /// Create a gate from an optional allowlist path
    ///
    /// Without a path the gate is permanently disabled and nothing is read.
    /// With a path the allowlist is loaded immediately; any failure is
    /// returned and no gate is built.
    pub fn new(path: Option<&Path>, resolver: Arc<dyn ReverseResolver>) -> Result<Self> {
        let allowlist = path.map(AllowSets::load).transpose()?;
        if allowlist.is_none() {
            info!("No allowlist configured, gate disabled");
        }

        Ok(Self {
            allowlist,
            resolver,
            lookup_timeout: None,
        })
    }

    /// A gate that never bypasses
    pub fn disabled() -> Self {
        Self {
            allowlist: None,
            resolver: Arc::new(NoopResolver),
            lookup_timeout: None,
        }
    }

    /// Create a gate around already loaded sets
    pub fn with_allowlist(allowlist: AllowSets, resolver: Arc<dyn ReverseResolver>) -> Self {
        Self {
            allowlist: Some(allowlist),
            resolver,
            lookup_timeout: None,
        }
    }

    /// Create a gate from configuration
    ///
    /// Uses the system resolver unless reverse lookups are switched off.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let resolver: Arc<dyn ReverseResolver> = if config.resolver.reverse_lookup {
            Arc::new(SystemResolver::new())
        } else {
            Arc::new(NoopResolver)
        };

        let mut gate = Self::new(config.allowlist.path.as_deref(), resolver)?;
        gate.lookup_timeout = config.lookup_timeout();
        Ok(gate)
    }

    /// Bound every reverse lookup by `timeout`
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Whether an allowlist is configured
    pub fn is_enabled(&self) -> bool {
        self.allowlist.is_some()
    }

    /// The loaded allowlist, if any
    pub fn allowlist(&self) -> Option<&AllowSets> {
        self.allowlist.as_ref()
    }

    /// Decide whether the request's client bypasses blocking
    #[instrument(skip(self, metadata), fields(client = %client_ip))]
    pub async fn decide<M>(&self, client_ip: IpAddr, metadata: &M) -> Decision
    where
        M: RequestMetadata + Sync + ?Sized,
    {
        self.decide_inner(client_ip, metadata, None).await
    }

    /// Like [`Gate::decide`], but gives up on the reverse lookup at `deadline`
    ///
    /// A deadline already in the past skips the lookup entirely.
    #[instrument(skip(self, metadata), fields(client = %client_ip))]
    pub async fn decide_until<M>(&self, client_ip: IpAddr, metadata: &M, deadline: Instant) -> Decision
    where
        M: RequestMetadata + Sync + ?Sized,
    {
        self.decide_inner(client_ip, metadata, Some(deadline)).await
    }

    async fn decide_inner<M>(&self, client_ip: IpAddr, metadata: &M, deadline: Option<Instant>) -> Decision
    where
        M: RequestMetadata + Sync + ?Sized,
    {
        if !self.is_enabled() {
            return Decision::Continue;
        }

        let identity = ClientIdentity::from_metadata(client_ip, metadata);
        let matched = self.evaluate(&identity, deadline).await;
        let decision = Decision::from(matched.is_some());

        debug!(matched = ?matched, decision = ?decision, "gate decision");
        decision
    }

    /// Check whether any attribute of `identity` is allowlisted
    pub async fn is_allowed(&self, identity: &ClientIdentity) -> bool {
        self.evaluate(identity, None).await.is_some()
    }

    /// Find the first attribute of `identity` that is allowlisted
    pub async fn evaluate(&self, identity: &ClientIdentity, deadline: Option<Instant>) -> Option<EntryKind> {
        let sets = self.allowlist.as_ref()?;

        // IPv4-mapped IPv6 clients (dual-stack listeners) match IPv4 entries
        if sets.contains_ip(&identity.ip.to_canonical().to_string()) {
            return Some(EntryKind::Ip);
        }

        if let Some(mac) = &identity.mac {
            if sets.contains_mac(&mac.to_lowercase()) {
                return Some(EntryKind::Mac);
            }
        }

        // No hostname entries means a lookup cannot change the outcome
        if !sets.has_names() {
            return None;
        }

        let hostname = match &identity.hostname {
            Some(name) => Some(name.clone()),
            None => self.resolve_hostname(identity.ip, deadline).await,
        };

        match hostname {
            Some(name) if sets.contains_name(&name.to_lowercase()) => Some(EntryKind::Name),
            _ => None,
        }
    }

    async fn resolve_hostname(&self, ip: IpAddr, deadline: Option<Instant>) -> Option<String> {
        let timeout_deadline = self.lookup_timeout.map(|t| Instant::now() + t);
        let deadline = match (deadline, timeout_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let result = match deadline {
            Some(deadline) if deadline <= Instant::now() => {
                debug!(%ip, "deadline passed, skipping reverse lookup");
                return None;
            }
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.resolver.reverse_lookup(ip)).await {
                    Ok(result) => result,
                    Err(_) => {
                        debug!(%ip, "reverse lookup timed out");
                        return None;
                    }
                }
            }
            None => self.resolver.reverse_lookup(ip).await,
        };

        match result {
            Ok(names) => primary_name(&names).map(str::to_string),
            Err(e) => {
                debug!(%ip, error = %e, "reverse lookup failed, hostname unknown");
                None
            }
        }
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("allowlist", &self.allowlist)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}
