//! Per-request client identity and decision outcome

use crate::metadata::RequestMetadata;
use std::net::IpAddr;

/// Outcome of a gate decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Skip the blocking stage for this request
    Bypass,
    /// Route the request through blocking as usual
    Continue,
}

impl Decision {
    /// Whether the blocking stage should be skipped
    pub fn is_bypass(self) -> bool {
        self == Self::Bypass
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Bypass
        } else {
            Self::Continue
        }
    }
}

/// Identity attributes observed for one request's client
///
/// Lives for a single decision only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Address the transport saw the query come from
    pub ip: IpAddr,
    /// Hardware address supplied by another stage
    pub mac: Option<String>,
    /// Hostname supplied by another stage; resolved on demand when absent
    pub hostname: Option<String>,
}

impl ClientIdentity {
    /// Identity known only by address
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            mac: None,
            hostname: None,
        }
    }

    /// Collect identity hints attached to the request
    pub fn from_metadata<M: RequestMetadata + ?Sized>(ip: IpAddr, metadata: &M) -> Self {
        Self {
            ip,
            mac: metadata.mac().map(str::to_string),
            hostname: metadata.hostname().map(str::to_string),
        }
    }

    /// Attach a MAC
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Attach a hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}
