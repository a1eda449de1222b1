//! Block parser for btmon transcripts.
//!
//! btmon prints one event per block: a header line starting at column 0,
//! followed by indented detail lines. The parser walks the lines once, keeps
//! the fields seen so far in an accumulator, and emits a [`Candidate`]
//! every time a new header line starts the next block.
//!
//! ```text
//! > HCI Event: LE Meta Event (0x3e) plen 43    #12 [hci0] 1680000000.123456
//!       LE Advertising Report (0x02)
//!         Address: AA:BB:CC:DD:EE:FF (Public)
//!         Company: Apple, Inc. (76)
//!         RSSI: -67 dBm (0xbd)
//! ```

use crate::candidate::Candidate;
use regex::Regex;
use std::sync::LazyLock;

/// Text after the last `] ` on a header line.
static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\] (.+)$").expect("timestamp pattern"));

static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:LE |BR/EDR )?Address: (.+?) ").expect("address pattern"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Name \(complete\): (.+)$").expect("name pattern"));

static COMPANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Company: (.+?) \(.+?\)$").expect("company pattern"));

static RSSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RSSI: (.+?) dBm").expect("rssi pattern"));

/// A field recognised on a detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Address(String),
    Name(String),
    Company(String),
    Rssi(String),
}

/// Fields collected for the block currently being read.
#[derive(Debug, Default)]
struct Accumulator(Candidate);

impl Accumulator {
    fn starting_at(timestamp: Option<String>) -> Self {
        Self(Candidate {
            timestamp,
            ..Candidate::default()
        })
    }

    /// A later line of the same kind replaces the earlier value.
    fn apply(&mut self, field: Field) {
        let c = &mut self.0;
        match field {
            Field::Address(v) => c.mac = Some(v),
            Field::Name(v) => c.name = Some(v),
            Field::Company(v) => c.manufacturer = Some(v),
            Field::Rssi(v) => c.rssi = Some(v),
        }
    }

    fn into_candidate(self) -> Candidate {
        self.0
    }
}

/// True for a non-empty line that does not start with whitespace.
pub fn is_block_boundary(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_whitespace())
}

/// Extract the trailing timestamp token from a header line.
pub fn header_timestamp(line: &str) -> Option<String> {
    TIMESTAMP
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Match a detail line (leading whitespace already removed) against the
/// field patterns. Address, name, company and RSSI are tried in that order and
/// the first match wins.
pub fn parse_detail(line: &str) -> Option<Field> {
    capture(&ADDRESS, line)
        .map(Field::Address)
        .or_else(|| capture(&NAME, line).map(Field::Name))
        .or_else(|| capture(&COMPANY, line).map(Field::Company))
        .or_else(|| capture(&RSSI, line).map(Field::Rssi))
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line).map(|caps| caps[1].to_string())
}

/// Iterator adapter turning transcript lines into one [`Candidate`] per block.
///
/// Every header line flushes the pending block, even when nothing was
/// captured for it; the pending block is also flushed once the input ends.
/// Filtering out unusable candidates is left to the aggregator.
#[derive(Debug)]
pub struct LogBlockParser<I> {
    lines: I,
    current: Accumulator,
    finished: bool,
}

impl<I> LogBlockParser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            current: Accumulator::default(),
            finished: false,
        }
    }
}

impl<I> Iterator for LogBlockParser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.finished {
            return None;
        }

        for line in self.lines.by_ref() {
            let line = line.as_ref().trim_end();

            if is_block_boundary(line) {
                let next = Accumulator::starting_at(header_timestamp(line));
                let done = std::mem::replace(&mut self.current, next);
                return Some(done.into_candidate());
            }

            if let Some(field) = parse_detail(line.trim_start()) {
                self.current.apply(field);
            }
        }

        self.finished = true;
        Some(std::mem::take(&mut self.current).into_candidate())
    }
}

/// Parse a whole transcript held in memory.
///
/// `\n`, `\r\n` and bare `\r` all end a line. The empty piece between `\r`
/// and `\n` is neither a header nor a detail, so it is skipped.
pub fn parse_blocks(text: &str) -> LogBlockParser<std::str::Split<'_, [char; 2]>> {
    LogBlockParser::new(text.split(['\r', '\n']))
}
