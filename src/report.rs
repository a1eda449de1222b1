//! Writing the rendered report to disk.
//!
//! The full table is rendered in memory before anything touches the
//! destination. It is then written to a temporary file next to the target and
//! moved into place, so an interrupted or failed run never leaves a truncated
//! report behind.

use crate::aggregator::ReportRow;
use crate::output::{Table, TableRenderer};
use log::{debug, info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// How many unrecognised answers are tolerated before giving up.
pub const MAX_PROMPT_ATTEMPTS: usize = 5;

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Ask on the terminal first
    #[default]
    Prompt,
    /// Replace without asking
    Always,
}

/// Result of a report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Written(PathBuf),
    /// Table sent to the caller's writer instead of a file
    Printed,
    /// The user kept the existing file
    Declined,
    /// No devices, nothing written
    Empty,
}

/// Errors raised while writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Could not create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not write to output file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not read overwrite confirmation: {0}")]
    Prompt(#[source] io::Error),
}

/// Ask whether `path` may be overwritten.
///
/// Answers are `y` or `n` in either case. Anything else repeats the question,
/// at most [`MAX_PROMPT_ATTEMPTS`] times; running out of attempts or reaching
/// the end of `input` counts as a no.
pub fn confirm_overwrite(
    path: &Path,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> io::Result<bool> {
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        write!(
            out,
            "output file '{}' exists, overwrite it? (y/n): ",
            path.display()
        )?;
        out.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
    Ok(false)
}

/// Render `rows` and write them to `path`.
///
/// Returns [`ReportOutcome::Empty`] without touching the filesystem when there
/// are no rows, and [`ReportOutcome::Declined`] when the destination exists
/// and the user refuses to overwrite it.
pub fn write_report(
    rows: &[ReportRow],
    renderer: &dyn TableRenderer,
    path: &Path,
    policy: OverwritePolicy,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<ReportOutcome, ReportError> {
    if rows.is_empty() {
        warn!("No bluetooth devices to report on");
        return Ok(ReportOutcome::Empty);
    }

    if path.exists()
        && policy == OverwritePolicy::Prompt
        && !confirm_overwrite(path, input, out).map_err(ReportError::Prompt)?
    {
        info!("Keeping existing output file '{}'", path.display());
        return Ok(ReportOutcome::Declined);
    }

    let contents = renderer.render(&Table::from_report(rows));
    persist(path, contents.as_bytes())?;

    info!("Bluetooth device report written to '{}'", path.display());
    Ok(ReportOutcome::Written(path.to_path_buf()))
}

/// Render `rows` straight to `out`.
pub fn print_report(
    rows: &[ReportRow],
    renderer: &dyn TableRenderer,
    out: &mut dyn Write,
) -> io::Result<ReportOutcome> {
    if rows.is_empty() {
        warn!("No bluetooth devices to report on");
        return Ok(ReportOutcome::Empty);
    }
    out.write_all(renderer.render(&Table::from_report(rows)).as_bytes())?;
    Ok(ReportOutcome::Printed)
}

fn persist(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    debug!("Staging report in '{}'", tmp.path().display());
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Rssi;
    use crate::output::TableFormat;
    use crate::output::text::TextTableRenderer;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn rows() -> Vec<ReportRow> {
        vec![ReportRow {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            first_time: 1.0,
            last_time: 2.5,
            name: "Tag".into(),
            manufacturer: "Unknown".into(),
            rssi: Rssi(-60),
        }]
    }

    fn renderer() -> TextTableRenderer {
        TextTableRenderer::new(TableFormat::Github)
    }

    #[test]
    fn test_confirm_yes_and_no() {
        let path = Path::new("report.md");
        let mut out = Vec::new();

        assert!(confirm_overwrite(path, &mut Cursor::new("y\n"), &mut out).unwrap());
        assert!(confirm_overwrite(path, &mut Cursor::new("Y\n"), &mut out).unwrap());
        assert!(!confirm_overwrite(path, &mut Cursor::new("n\n"), &mut out).unwrap());
        assert!(!confirm_overwrite(path, &mut Cursor::new("N\n"), &mut out).unwrap());

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("output file 'report.md' exists, overwrite it? (y/n): "));
    }

    #[test]
    fn test_confirm_retries_on_invalid_answer() {
        let mut out = Vec::new();
        let answer =
            confirm_overwrite(Path::new("r"), &mut Cursor::new("maybe\nyes\ny\n"), &mut out)
                .unwrap();
        assert!(answer);
        assert_eq!(String::from_utf8(out).unwrap().matches("(y/n)").count(), 3);
    }

    #[test]
    fn test_confirm_gives_up_after_max_attempts() {
        let mut out = Vec::new();
        let input = "?\n".repeat(MAX_PROMPT_ATTEMPTS) + "y\n";
        let answer = confirm_overwrite(Path::new("r"), &mut Cursor::new(input), &mut out).unwrap();
        assert!(!answer);
        assert_eq!(
            String::from_utf8(out).unwrap().matches("(y/n)").count(),
            MAX_PROMPT_ATTEMPTS
        );
    }

    #[test]
    fn test_confirm_eof_declines() {
        let mut out = Vec::new();
        assert!(!confirm_overwrite(Path::new("r"), &mut Cursor::new(""), &mut out).unwrap());
    }

    #[test]
    fn test_empty_rows_write_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        let outcome = write_report(
            &[],
            &renderer(),
            &path,
            OverwritePolicy::Always,
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap();
        assert_eq!(outcome, ReportOutcome::Empty);
        assert!(!path.exists());
    }

    #[test]
    fn test_print_report() {
        let mut out = Vec::new();
        assert_eq!(
            print_report(&rows(), &renderer(), &mut out).unwrap(),
            ReportOutcome::Printed
        );
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 3);
        assert!(out.ends_with('\n'));

        let mut out = Vec::new();
        assert_eq!(
            print_report(&[], &renderer(), &mut out).unwrap(),
            ReportOutcome::Empty
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_writes_new_file_and_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/report.md");
        let outcome = write_report(
            &rows(),
            &renderer(),
            &path,
            OverwritePolicy::Prompt,
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap();
        assert_eq!(outcome, ReportOutcome::Written(path.clone()));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("| MAC Address "));
        assert!(written.contains("| AA:BB:CC:DD:EE:FF |"));
        assert!(written.contains("| Tag "));
    }

    #[test]
    fn test_declined_overwrite_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "old").unwrap();

        let mut prompt = Vec::new();
        let outcome = write_report(
            &rows(),
            &renderer(),
            &path,
            OverwritePolicy::Prompt,
            &mut Cursor::new("n\n"),
            &mut prompt,
        )
        .unwrap();

        assert_eq!(outcome, ReportOutcome::Declined);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        assert!(!prompt.is_empty());
    }

    #[test]
    fn test_accepted_overwrite_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "old").unwrap();

        let outcome = write_report(
            &rows(),
            &renderer(),
            &path,
            OverwritePolicy::Prompt,
            &mut Cursor::new("y\n"),
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(outcome, ReportOutcome::Written(path.clone()));
        assert!(std::fs::read_to_string(&path).unwrap().contains("Tag"));
    }

    #[test]
    fn test_always_policy_never_prompts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "old").unwrap();

        let mut prompt = Vec::new();
        write_report(
            &rows(),
            &renderer(),
            &path,
            OverwritePolicy::Always,
            &mut Cursor::new(""),
            &mut prompt,
        )
        .unwrap();

        assert!(prompt.is_empty());
        assert!(std::fs::read_to_string(&path).unwrap().contains("Tag"));
    }

    #[test]
    fn test_unwritable_destination_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be replaced by a file.
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let err = write_report(
            &rows(),
            &renderer(),
            &path,
            OverwritePolicy::Always,
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(err, ReportError::Write { .. }));
        assert!(path.is_dir());
        // Only the pre-existing directory remains; the staging file is gone.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
