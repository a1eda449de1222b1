//! Core application runner (business logic) for `btmon-report`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit codes
//! so it can be tested deterministically.

use crate::aggregator::{DeviceAggregator, MergeStats};
use crate::output::TableFormat;
use crate::output::text::TextTableRenderer;
use crate::report::{self, OverwritePolicy, ReportError, ReportOutcome};
use crate::source::{LogSource, SourceError, SourceEvent};
use clap::Parser;
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration for a report run.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// btmon output files to parse
    #[arg(
        short = 'i',
        long = "inputFiles",
        visible_alias = "input-files",
        value_name = "FILE",
        num_args = 1..,
        required = true
    )]
    pub input_files: Vec<PathBuf>,

    /// File to save output to (default: standard output)
    #[arg(
        short = 'o',
        long = "outFile",
        visible_alias = "out-file",
        value_name = "FILE"
    )]
    pub out_file: Option<PathBuf>,

    /// Format for output tables
    #[arg(short = 'f', long, default_value_t, value_enum)]
    pub format: TableFormat,

    /// Overwrite existing output files without asking
    #[arg(short = 'n', long = "noPrompt", visible_alias = "no-prompt")]
    pub no_prompt: bool,

    /// Verbose output, log every parsing step
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Options {
    pub fn overwrite_policy(&self) -> OverwritePolicy {
        if self.no_prompt {
            OverwritePolicy::Always
        } else {
            OverwritePolicy::Prompt
        }
    }
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Input files read to the end
    pub files: usize,
    /// Blocks parsed across all files
    pub blocks: usize,
    pub devices: usize,
    pub merges: MergeStats,
    pub report: ReportOutcome,
}

/// Run the whole pipeline: read every input, merge, then report.
///
/// - The table goes to `options.out_file`, or to `out` when no file is given.
/// - The overwrite prompt reads answers from `input` and is written to `out`.
/// - After a report (or an empty result) the device summary is written to `out`;
///   a declined overwrite ends the run without it.
pub async fn run_with_io(
    options: Options,
    source: &dyn LogSource,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<RunSummary, RunError> {
    let mut aggregator = DeviceAggregator::new();
    let mut merges = MergeStats::default();
    let mut files = 0;
    let mut blocks = 0;

    let mut events = source.start_read(&options.input_files).await?;

    while let Some(event) = events.recv().await {
        match event? {
            SourceEvent::Candidate(candidate) => merges.record(&aggregator.merge(candidate)),
            SourceEvent::FileStarted(path) => info!("Parsing '{}'", path.display()),
            SourceEvent::FileFinished { blocks: n, .. } => {
                files += 1;
                blocks += n;
            }
        }
    }

    debug!(
        "Merged {} blocks from {} files: {} new devices, {} updates, {} skipped",
        blocks,
        files,
        merges.inserted,
        merges.updated,
        merges.discarded
    );

    let rows = aggregator.rows();
    let renderer = TextTableRenderer::new(options.format);

    let outcome = match &options.out_file {
        Some(path) => {
            report::write_report(&rows, &renderer, path, options.overwrite_policy(), input, out)?
        }
        None => report::print_report(&rows, &renderer, out)?,
    };

    if outcome == ReportOutcome::Declined {
        debug!("Terminated by user");
    } else {
        write!(out, "\nParsing complete!\n\n{}\n\n", aggregator.summary())?;
    }

    Ok(RunSummary {
        files,
        blocks,
        devices: aggregator.len(),
        merges,
        report: outcome,
    })
}
