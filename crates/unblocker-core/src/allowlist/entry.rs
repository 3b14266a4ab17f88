//! Allowlist line classification

use crate::mac::MacAddr;
use std::fmt;
use std::net::IpAddr;

/// Kind of identity an allowlist entry names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// IPv4 or IPv6 address literal
    Ip,
    /// 48-bit hardware address
    Mac,
    /// Anything else, treated as a hostname
    Name,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ip => "ip",
            Self::Mac => "mac",
            Self::Name => "name",
        })
    }
}

/// A single classified allowlist line, already normalized for its set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    /// Trimmed text of an IP literal, case untouched
    Ip(String),
    /// Lowercased MAC literal
    Mac(String),
    /// Lowercased hostname
    Name(String),
}

impl Entry {
    /// Classify one line of allowlist source
    ///
    /// Returns `None` for blank lines and `#` comments. Classification order
    /// is IP, then MAC, then hostname, so every other line yields exactly
    /// one entry.
    pub fn classify(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if line.parse::<IpAddr>().is_ok() {
            Some(Self::Ip(line.to_string()))
        } else if MacAddr::is_mac(line) {
            Some(Self::Mac(line.to_lowercase()))
        } else {
            Some(Self::Name(line.to_lowercase()))
        }
    }

    /// Kind of this entry
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Ip(_) => EntryKind::Ip,
            Self::Mac(_) => EntryKind::Mac,
            Self::Name(_) => EntryKind::Name,
        }
    }

    /// Normalized value as stored in the allow sets
    pub fn value(&self) -> &str {
        match self {
            Self::Ip(v) | Self::Mac(v) | Self::Name(v) => v,
        }
    }

    /// Whether `text` is an IP literal written the way client addresses are
    /// printed for matching
    ///
    /// Client addresses are unmapped from IPv4-mapped IPv6 and formatted
    /// canonically (lowercase, RFC 5952 compression). Entries written any
    /// other way are kept but can never match.
    pub fn is_canonical_ip(text: &str) -> bool {
        match text.parse::<IpAddr>() {
            Ok(addr) => addr.to_canonical().to_string() == text,
            Err(_) => false,
        }
    }

    /// Consume the entry, returning the stored value
    pub fn into_value(self) -> String {
        match self {
            Self::Ip(v) | Self::Mac(v) | Self::Name(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_and_comments() {
        assert_eq!(Entry::classify(""), None);
        assert_eq!(Entry::classify("   \t "), None);
        assert_eq!(Entry::classify("# kids' tablets"), None);
        assert_eq!(Entry::classify("   # indented comment"), None);
    }

    #[test]
    fn test_ip_kept_verbatim() {
        assert_eq!(
            Entry::classify("  192.168.1.20  "),
            Some(Entry::Ip("192.168.1.20".to_string()))
        );
        // Case of hex digits is not folded for IPs
        assert_eq!(
            Entry::classify("2001:DB8::1"),
            Some(Entry::Ip("2001:DB8::1".to_string()))
        );
    }

    #[test]
    fn test_canonical_ip_forms() {
        assert!(Entry::is_canonical_ip("192.168.1.20"));
        assert!(Entry::is_canonical_ip("2001:db8::1"));
        assert!(!Entry::is_canonical_ip("2001:DB8::1"));
        assert!(!Entry::is_canonical_ip("2001:0db8:0:0:0:0:0:1"));
        assert!(!Entry::is_canonical_ip("::ffff:192.0.2.1"));
        assert!(!Entry::is_canonical_ip("laptop.local"));
    }

    #[test]
    fn test_mac_lowercased() {
        assert_eq!(
            Entry::classify("AA:BB:CC:DD:EE:FF"),
            Some(Entry::Mac("aa:bb:cc:dd:ee:ff".to_string()))
        );
        assert_eq!(
            Entry::classify("AA-BB-CC-DD-EE-FF"),
            Some(Entry::Mac("aa-bb-cc-dd-ee-ff".to_string()))
        );
    }

    #[test]
    fn test_everything_else_is_a_name() {
        assert_eq!(
            Entry::classify("Laptop.Local"),
            Some(Entry::Name("laptop.local".to_string()))
        );
        // Looks address-like but is neither
        assert_eq!(
            Entry::classify("192.168.1.300"),
            Some(Entry::Name("192.168.1.300".to_string()))
        );
        assert_eq!(Entry::classify("aa:bb:cc").map(|e| e.kind()), Some(EntryKind::Name));
    }

    #[test]
    fn test_hash_inside_line_is_not_a_comment() {
        let entry = Entry::classify("media#box").unwrap();
        assert_eq!(entry.kind(), EntryKind::Name);
        assert_eq!(entry.value(), "media#box");
    }
}
