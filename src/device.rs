//! Merged per-device record.

use crate::mac_address::MacAddress;
use std::fmt;

/// Received signal strength in dBm.
///
/// [`Rssi::UNKNOWN`] stands in for sightings without an RSSI line; its
/// magnitude is larger than any real reading so a measured value always
/// replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rssi(pub i32);

impl Rssi {
    pub const UNKNOWN: Rssi = Rssi(5000);

    /// Largest magnitude still displayed as a number.
    pub const MAX_DISPLAY_MAGNITUDE: u32 = 255;

    pub fn magnitude(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Closer to zero is stronger.
    pub fn is_stronger_than(self, other: Rssi) -> bool {
        self.magnitude() < other.magnitude()
    }

    /// The reading, or `None` when it is the sentinel or implausibly large.
    pub fn displayable(self) -> Option<i32> {
        (self.magnitude() <= Self::MAX_DISPLAY_MAGNITUDE).then_some(self.0)
    }
}

impl Default for Rssi {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for Rssi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.displayable() {
            Some(dbm) => write!(f, "{dbm}"),
            None => f.write_str("Unknown"),
        }
    }
}

/// Everything known about one device address.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub mac: MacAddress,
    /// Earliest sighting, seconds. Always `<= last_time`.
    pub first_time: f64,
    /// Latest sighting, seconds.
    pub last_time: f64,
    /// First non-empty complete name seen
    pub name: Option<String>,
    /// First non-empty company name seen
    pub manufacturer: Option<String>,
    /// Strongest reading seen
    pub rssi: Rssi,
}

impl DeviceRecord {
    pub fn new(mac: MacAddress, timestamp: f64) -> Self {
        Self {
            mac,
            first_time: timestamp,
            last_time: timestamp,
            name: None,
            manufacturer: None,
            rssi: Rssi::UNKNOWN,
        }
    }

    /// Name for display, falling back to the address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.mac.as_str())
    }

    /// Manufacturer for display, falling back to `Unknown`.
    pub fn display_manufacturer(&self) -> &str {
        self.manufacturer.as_deref().unwrap_or("Unknown")
    }
}
