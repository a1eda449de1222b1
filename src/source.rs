//! Input side of the pipeline: btmon transcripts on disk.
//!
//! A [`LogSource`] turns a list of input paths into a stream of
//! [`SourceEvent`]s. Files are read one after another, each parsed completely
//! before the next is opened, and every block becomes a
//! [`SourceEvent::Candidate`] on the channel.

use crate::candidate::Candidate;
use crate::parser::parse_blocks;
use log::{debug, warn};
use std::borrow::Cow;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel buffer size for parsed candidates.
pub const CANDIDATE_CHANNEL_BUFFER_SIZE: usize = 100;

/// Progress and data emitted while reading inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    FileStarted(PathBuf),
    Candidate(Candidate),
    FileFinished { path: PathBuf, blocks: usize },
}

/// Error type for reading inputs.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No input files given")]
    NoInput,
    #[error("Could not read input file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Convenience alias for source events or read errors.
pub type SourceResult = Result<SourceEvent, SourceError>;

/// Boxed future returned by [`LogSource::start_read`].
pub type StartRead<'a> =
    Pin<Box<dyn Future<Output = Result<mpsc::Receiver<SourceResult>, SourceError>> + Send + 'a>>;

/// Source abstraction to enable deterministic tests without files on disk.
pub trait LogSource: Send + Sync {
    fn start_read(&self, paths: &[PathBuf]) -> StartRead<'_>;
}

/// Reads transcripts from the filesystem.
///
/// A file that cannot be read ends the stream with a
/// [`SourceError::Read`]; nothing after it is read.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl LogSource for FileSource {
    fn start_read(&self, paths: &[PathBuf]) -> StartRead<'_> {
        let paths = paths.to_vec();
        Box::pin(async move {
            if paths.is_empty() {
                return Err(SourceError::NoInput);
            }
            let (tx, rx) = mpsc::channel(CANDIDATE_CHANNEL_BUFFER_SIZE);
            tokio::spawn(read_files(paths, tx));
            Ok(rx)
        })
    }
}

async fn read_files(paths: Vec<PathBuf>, tx: mpsc::Sender<SourceResult>) {
    for path in paths {
        if !read_file(path, &tx).await {
            return;
        }
    }
}

/// Stream one file. Returns false once the stream should stop, either because
/// the file failed or because the receiver went away.
async fn read_file(path: PathBuf, tx: &mpsc::Sender<SourceResult>) -> bool {
    debug!("Initiated parsing of input file '{}'", path.display());
    if tx.send(Ok(SourceEvent::FileStarted(path.clone()))).await.is_err() {
        return false;
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(source) => {
            let _ = tx.send(Err(SourceError::Read { path, source })).await;
            return false;
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        warn!(
            "Replaced undecodable bytes while reading '{}'",
            path.display()
        );
    }

    let mut blocks = 0;
    for candidate in parse_blocks(&text) {
        blocks += 1;
        if tx.send(Ok(SourceEvent::Candidate(candidate))).await.is_err() {
            return false;
        }
    }

    debug!("Parsing of '{}' complete: {} blocks", path.display(), blocks);
    tx.send(Ok(SourceEvent::FileFinished { path, blocks }))
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::block;
    use tempfile::TempDir;

    async fn drain(mut rx: mpsc::Receiver<SourceResult>) -> Vec<SourceResult> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn candidates(events: &[SourceResult]) -> Vec<&Candidate> {
        events
            .iter()
            .filter_map(|e| match e {
                Ok(SourceEvent::Candidate(c)) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_reads_files_in_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");
        std::fs::write(&first, block("11:11:11:11:11:11", "1.0", Some(-40), None)).unwrap();
        std::fs::write(&second, block("22:22:22:22:22:22", "2.0", None, None)).unwrap();

        let rx = FileSource
            .start_read(&[first.clone(), second.clone()])
            .await
            .unwrap();
        let events = drain(rx).await;

        assert!(matches!(&events[0], Ok(SourceEvent::FileStarted(p)) if p == &first));
        assert!(matches!(
            events.last(),
            Some(Ok(SourceEvent::FileFinished { path, blocks: 2 })) if path == &second
        ));

        let macs: Vec<Option<&str>> = candidates(&events)
            .iter()
            .map(|c| c.mac.as_deref())
            .collect();
        assert_eq!(
            macs,
            vec![
                None,
                Some("11:11:11:11:11:11"),
                None,
                Some("22:22:22:22:22:22")
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.log");
        let mut bytes = b"> Event [hci0] 3.0\n    Name (complete): Caf".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(b"\n    Address: 33:33:33:33:33:33 (Public)\n");
        std::fs::write(&path, bytes).unwrap();

        let events = drain(FileSource.start_read(&[path]).await.unwrap()).await;
        let found = candidates(&events);
        let last = found.last().unwrap();

        assert_eq!(last.mac.as_deref(), Some("33:33:33:33:33:33"));
        assert_eq!(last.name.as_deref(), Some("Caf\u{FFFD}\u{FFFD}"));
    }

    #[tokio::test]
    async fn test_missing_file_stops_stream() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.log");
        let present = dir.path().join("present.log");
        std::fs::write(&present, block("44:44:44:44:44:44", "4.0", None, None)).unwrap();

        let events = drain(
            FileSource
                .start_read(&[missing.clone(), present])
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            Err(SourceError::Read { path, .. }) if path == &missing
        ));
    }

    #[tokio::test]
    async fn test_no_input_rejected() {
        assert!(matches!(
            FileSource.start_read(&[]).await,
            Err(SourceError::NoInput)
        ));
    }

    #[test]
    fn test_read_error_display() {
        let err = SourceError::Read {
            path: PathBuf::from("capture.log"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Could not read input file 'capture.log': not found"
        );
    }
}
