//! Candidate device sighting extracted from one btmon block.

/// The raw fields captured from a single block.
///
/// Values are kept as the text that appeared in the log; the aggregator is
/// responsible for normalizing and validating them. A field is `None` when the
/// block had no matching line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Timestamp text taken from the block header line (seconds)
    pub timestamp: Option<String>,
    /// Device address as printed by btmon
    pub mac: Option<String>,
    /// Complete local name
    pub name: Option<String>,
    /// Company name, without the numeric company identifier
    pub manufacturer: Option<String>,
    /// Signal strength text in dBm
    pub rssi: Option<String>,
}
