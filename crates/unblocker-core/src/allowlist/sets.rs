//! Allowlist loading and membership sets

use super::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters collected while scanning an allowlist source
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines read from the source
    pub lines: usize,
    /// Blank and comment lines
    pub skipped: usize,
    /// Lines classified as IP literals
    pub ips: usize,
    /// Lines classified as MAC literals
    pub macs: usize,
    /// Lines classified as hostnames
    pub names: usize,
}

impl LoadReport {
    /// Lines that produced an entry (duplicates included)
    pub fn entries(&self) -> usize {
        self.ips + self.macs + self.names
    }

    fn record(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Ip => self.ips += 1,
            EntryKind::Mac => self.macs += 1,
            EntryKind::Name => self.names += 1,
        }
    }
}

/// The three identity sets a gate matches against
///
/// Built once from an allowlist source and never mutated afterwards.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AllowSets {
    ips: HashSet<String>,
    macs: HashSet<String>,
    names: HashSet<String>,
}

impl AllowSets {
    /// Load an allowlist file
    ///
    /// File format:
    /// - One entry per line
    /// - Lines starting with # are comments
    /// - Empty lines are ignored
    /// - Each entry is an IP literal, a MAC literal or a hostname
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_report(path).map(|(sets, _)| sets)
    }

    /// Load an allowlist file, also returning scan counters
    pub fn load_with_report<P: AsRef<Path>>(path: P) -> Result<(Self, LoadReport)> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::AllowlistOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let (sets, report) = Self::from_reader(BufReader::new(file), path)?;

        info!(
            path = %path.display(),
            ips = sets.ips.len(),
            macs = sets.macs.len(),
            names = sets.names.len(),
            "Loaded allowlist"
        );
        Ok((sets, report))
    }

    /// Build sets from any line-oriented reader
    ///
    /// `label` only names the source in diagnostics. A read failure
    /// discards every entry classified so far.
    pub fn from_reader<R: BufRead>(reader: R, label: &Path) -> Result<(Self, LoadReport)> {
        let mut sets = Self::default();
        let mut report = LoadReport::default();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| Error::AllowlistRead {
                path: source_label(label),
                line: line_no,
                source,
            })?;
            report.lines = line_no;

            let Some(entry) = Entry::classify(&line) else {
                report.skipped += 1;
                continue;
            };

            if let Entry::Ip(ref text) = entry {
                warn_non_canonical(text, line_no);
            }

            debug!(line = line_no, kind = %entry.kind(), value = entry.value(), "allowlist entry");
            report.record(entry.kind());
            sets.insert(entry);
        }

        Ok((sets, report))
    }

    /// Build sets from in-memory text
    pub fn parse(content: &str) -> Self {
        content.lines().filter_map(Entry::classify).collect()
    }

    fn insert(&mut self, entry: Entry) {
        match entry {
            Entry::Ip(v) => self.ips.insert(v),
            Entry::Mac(v) => self.macs.insert(v),
            Entry::Name(v) => self.names.insert(v),
        };
    }

    /// Exact-text membership of an IP
    pub fn contains_ip(&self, ip: &str) -> bool {
        self.ips.contains(ip)
    }

    /// Membership of an already lowercased MAC
    pub fn contains_mac(&self, mac: &str) -> bool {
        self.macs.contains(mac)
    }

    /// Membership of an already lowercased hostname
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether any hostname entries exist
    pub fn has_names(&self) -> bool {
        !self.names.is_empty()
    }

    /// Sorted IP entries
    pub fn ips(&self) -> Vec<&str> {
        sorted(&self.ips)
    }

    /// Sorted MAC entries
    pub fn macs(&self) -> Vec<&str> {
        sorted(&self.macs)
    }

    /// Sorted hostname entries
    pub fn names(&self) -> Vec<&str> {
        sorted(&self.names)
    }

    /// Total number of distinct entries
    pub fn len(&self) -> usize {
        self.ips.len() + self.macs.len() + self.names.len()
    }

    /// Check if no entries were loaded
    pub fn is_empty(&self) -> bool {
        self.ips.is_empty() && self.macs.is_empty() && self.names.is_empty()
    }
}

impl FromIterator<Entry> for AllowSets {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut sets = Self::default();
        for entry in iter {
            sets.insert(entry);
        }
        sets
    }
}

fn sorted(set: &HashSet<String>) -> Vec<&str> {
    let mut values: Vec<&str> = set.iter().map(String::as_str).collect();
    values.sort_unstable();
    values
}

fn source_label(label: &Path) -> PathBuf {
    if label.as_os_str().is_empty() {
        PathBuf::from("<memory>")
    } else {
        label.to_path_buf()
    }
}

// A differently written entry is kept as-is but can never match.
fn warn_non_canonical(text: &str, line_no: usize) {
    if Entry::is_canonical_ip(text) {
        return;
    }
    if let Ok(addr) = text.parse::<IpAddr>() {
        warn!(
            line = line_no,
            entry = text,
            canonical = %addr.to_canonical(),
            "IP entry is not in canonical form and will not match client addresses"
        );
    }
}
