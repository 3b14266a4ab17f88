//! Client allowlist
//!
//! An allowlist is a flat text file naming clients that may skip the
//! blocking stage. Each non-comment line is classified as:
//! - An IP literal (stored verbatim, matched by exact text)
//! - A 48-bit MAC literal (stored lowercased)
//! - A hostname (stored lowercased)
//!
//! The resulting [`AllowSets`] is immutable once loaded.

mod entry;
mod sets;

pub use entry::{Entry, EntryKind};
pub use sets::{AllowSets, LoadReport};
