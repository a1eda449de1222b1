//! Device aggregation and report rows.
//!
//! Every candidate emitted by the parser is folded into a single map keyed by
//! normalized address. The merge rules are:
//!
//! - candidates without an address are dropped;
//! - the time range only grows: an earlier timestamp moves `first_time`,
//!   otherwise a later one moves `last_time` (never both from one sighting);
//! - name and manufacturer keep the first non-empty value ever seen;
//! - the strongest RSSI (smallest magnitude) is kept.

use crate::candidate::Candidate;
use crate::device::{DeviceRecord, Rssi};
use crate::mac_address::MacAddress;
use log::{debug, warn};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::num::IntErrorKind;

/// Why a candidate was not merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    EmptyMac,
    MissingTimestamp,
    InvalidTimestamp(String),
    InvalidRssi(String),
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::EmptyMac => write!(f, "no device address"),
            DiscardReason::MissingTimestamp => write!(f, "no timestamp"),
            DiscardReason::InvalidTimestamp(raw) => write!(f, "invalid timestamp '{raw}'"),
            DiscardReason::InvalidRssi(raw) => write!(f, "invalid RSSI '{raw}'"),
        }
    }
}

/// Result of merging one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First sighting of the address
    Inserted,
    /// Existing record updated in place
    Updated,
    Discarded(DiscardReason),
}

/// Running counts of merge outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub discarded: usize,
}

impl MergeStats {
    pub fn record(&mut self, outcome: &MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserted += 1,
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Discarded(_) => self.discarded += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.discarded
    }
}

/// One line of the device report, with fallbacks already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub mac: String,
    pub first_time: f64,
    pub last_time: f64,
    pub name: String,
    pub manufacturer: String,
    pub rssi: Rssi,
}

impl ReportRow {
    pub const HEADINGS: [&'static str; 6] = [
        "MAC Address",
        "First Time",
        "Last Time",
        "Common Name",
        "Manufacturer",
        "RSSI",
    ];

    /// Sort key: displayed RSSI and address, compared as text.
    fn sort_key(&self) -> String {
        format!("{} {}", self.rssi, self.mac)
    }

    /// The row as display cells, in [`ReportRow::HEADINGS`] order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.mac.clone(),
            self.first_time.to_string(),
            self.last_time.to_string(),
            self.name.clone(),
            self.manufacturer.clone(),
            self.rssi.to_string(),
        ]
    }
}

impl From<&DeviceRecord> for ReportRow {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            mac: record.mac.to_string(),
            first_time: record.first_time,
            last_time: record.last_time,
            name: record.display_name().to_string(),
            manufacturer: record.display_manufacturer().to_string(),
            rssi: record.rssi,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_timestamp(raw: Option<&str>) -> Result<f64, DiscardReason> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(DiscardReason::MissingTimestamp);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| DiscardReason::InvalidTimestamp(raw.to_string()))
}

fn parse_rssi(raw: Option<&str>) -> Result<Rssi, DiscardReason> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(Rssi::UNKNOWN);
    }
    match raw.parse::<i32>() {
        Ok(dbm) => Ok(Rssi(dbm)),
        // A number too large for any reading shows as unknown.
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Ok(Rssi::UNKNOWN)
        }
        Err(_) => Err(DiscardReason::InvalidRssi(raw.to_string())),
    }
}

/// Owns every device record seen across all parsed files.
#[derive(Debug, Default)]
pub struct DeviceAggregator {
    devices: HashMap<MacAddress, DeviceRecord>,
}

impl DeviceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one candidate into the device map.
    ///
    /// Never fails: candidates that cannot be used are reported as
    /// [`MergeOutcome::Discarded`] and leave the map untouched.
    pub fn merge(&mut self, candidate: Candidate) -> MergeOutcome {
        let outcome = self.try_merge(candidate);
        if let MergeOutcome::Discarded(reason) = &outcome {
            match reason {
                DiscardReason::EmptyMac => debug!("Skipping block: {reason}"),
                _ => warn!("Skipping block: {reason}"),
            }
        }
        outcome
    }

    fn try_merge(&mut self, candidate: Candidate) -> MergeOutcome {
        let Some(mac) = candidate.mac.as_deref().and_then(MacAddress::normalize) else {
            return MergeOutcome::Discarded(DiscardReason::EmptyMac);
        };
        let timestamp = match parse_timestamp(candidate.timestamp.as_deref()) {
            Ok(t) => t,
            Err(reason) => return MergeOutcome::Discarded(reason),
        };
        let rssi = match parse_rssi(candidate.rssi.as_deref()) {
            Ok(r) => r,
            Err(reason) => return MergeOutcome::Discarded(reason),
        };
        let name = non_empty(candidate.name);
        let manufacturer = non_empty(candidate.manufacturer);

        match self.devices.entry(mac) {
            Entry::Vacant(entry) => {
                let mut record = DeviceRecord::new(entry.key().clone(), timestamp);
                record.name = name;
                record.manufacturer = manufacturer;
                record.rssi = rssi;
                entry.insert(record);
                MergeOutcome::Inserted
            }
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();

                if timestamp < record.first_time {
                    record.first_time = timestamp;
                } else if timestamp > record.last_time {
                    record.last_time = timestamp;
                }
                if record.name.is_none() {
                    record.name = name;
                }
                if record.manufacturer.is_none() {
                    record.manufacturer = manufacturer;
                }
                if rssi.is_stronger_than(record.rssi) {
                    record.rssi = rssi;
                }
                MergeOutcome::Updated
            }
        }
    }

    /// Merge a sequence of candidates, returning the outcome counts.
    pub fn merge_all<I>(&mut self, candidates: I) -> MergeStats
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut stats = MergeStats::default();
        for candidate in candidates {
            stats.record(&self.merge(candidate));
        }
        stats
    }

    pub fn get(&self, mac: &str) -> Option<&DeviceRecord> {
        MacAddress::normalize(mac).and_then(|mac| self.devices.get(&mac))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }

    /// Report rows sorted by the text of `"<rssi> <mac>"`.
    ///
    /// The ordering compares the displayed RSSI as a string, so `-9` sorts
    /// after `-80` and `Unknown` after every number.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = self.records().map(ReportRow::from).collect();
        rows.sort_by_cached_key(ReportRow::sort_key);
        rows
    }

    pub fn summary(&self) -> String {
        format!("Total bluetooth devices identified: {}", self.len())
    }
}
