//! Normalized Bluetooth device address used as the aggregation key.
//!
//! btmon prints both LE and BR/EDR addresses, sometimes in lowercase and
//! sometimes padded with whitespace. Records are keyed on the trimmed,
//! uppercased text so the same device seen in different captures merges into
//! one row. The text is not required to be a well-formed 6-octet address.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A normalized device address. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(String);

impl MacAddress {
    /// Normalize a raw captured address, returning `None` when nothing is left
    /// after trimming.
    ///
    /// # Example
    /// ```
    /// use btmon_report::MacAddress;
    ///
    /// let mac = MacAddress::normalize(" aa:bb:cc:dd:ee:ff ").unwrap();
    /// assert_eq!(mac.as_str(), "AA:BB:CC:DD:EE:FF");
    /// assert!(MacAddress::normalize("   ").is_none());
    /// ```
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MacAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors returned when parsing a MAC address string.
#[derive(Error, Debug, PartialEq)]
pub enum ParseMacError {
    #[error("invalid MAC address: empty after trimming")]
    Empty,
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or(ParseMacError::Empty)
    }
}
