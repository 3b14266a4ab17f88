//! Per-request metadata
//!
//! Other stages of the host pipeline may attach identity hints to a request
//! before it reaches the gate, e.g. a DHCP lease correlator supplying the
//! client's MAC, or a device-naming stage supplying a hostname. The gate
//! only reads them through [`RequestMetadata`].

use std::collections::HashMap;

/// Metadata key carrying the client's hardware address
pub const MAC_KEY: &str = "unblocker/mac";

/// Metadata key carrying the client's hostname
pub const HOSTNAME_KEY: &str = "unblocker/hostname";

/// Read-only access to values attached to the current request
pub trait RequestMetadata {
    /// Look up a value by key
    fn value(&self, key: &str) -> Option<&str>;

    /// Client MAC supplied by another stage
    fn mac(&self) -> Option<&str> {
        self.value(MAC_KEY)
    }

    /// Client hostname supplied by another stage
    fn hostname(&self) -> Option<&str> {
        self.value(HOSTNAME_KEY)
    }
}

/// No metadata attached
impl RequestMetadata for () {
    fn value(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl RequestMetadata for HashMap<String, String> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Owned key/value metadata for a single request
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    values: HashMap<String, String>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a client MAC
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.insert(MAC_KEY, mac);
        self
    }

    /// Attach a client hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.insert(HOSTNAME_KEY, hostname);
        self
    }

    /// Set an arbitrary key, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of attached values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is attached
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl RequestMetadata for Metadata {
    fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}
