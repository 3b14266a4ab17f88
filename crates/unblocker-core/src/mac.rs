//! Hardware address literals
//!
//! Only the 48-bit form is recognized, written as six two-digit hex octets
//! separated consistently by `:` or `-`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed 48-bit MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Create from raw octets
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Raw octets
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Check whether `s` is a MAC literal without keeping the result
    pub fn is_mac(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMac {
            input: s.to_string(),
        };

        // xx:xx:xx:xx:xx:xx
        if s.len() != 17 {
            return Err(invalid());
        }
        let sep = match s.as_bytes()[2] {
            b':' => ':',
            b'-' => '-',
            _ => return Err(invalid()),
        };

        let mut octets = [0u8; 6];
        let mut parts = s.split(sep);
        for octet in &mut octets {
            let part = parts.next().ok_or_else(invalid)?;
            let mut buf = [0u8; 1];
            hex::decode_to_slice(part, &mut buf).map_err(|_| invalid())?;
            *octet = buf[0];
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
