//! `btmon-report` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, logger setup and
//! process exit codes. The pipeline lives here: [`parser`] splits a btmon
//! transcript into per-event candidates, [`aggregator`] merges them into one
//! record per device, and [`report`] writes the rendered table.
//! [`app::run_with_io`] ties the stages together with injected input and
//! output streams so it can be tested deterministically.

pub mod aggregator;
pub mod app;
pub mod candidate;
pub mod device;
pub mod mac_address;
pub mod output;
pub mod parser;
pub mod report;
pub mod source;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use aggregator::{DeviceAggregator, DiscardReason, MergeOutcome, MergeStats, ReportRow};
pub use candidate::Candidate;
pub use device::{DeviceRecord, Rssi};
pub use mac_address::MacAddress;
pub use output::text::TextTableRenderer;
pub use output::{Table, TableFormat, TableRenderer};
pub use parser::{LogBlockParser, parse_blocks};
pub use report::{OverwritePolicy, ReportError, ReportOutcome};
pub use source::{FileSource, LogSource, SourceError, SourceEvent, SourceResult};
