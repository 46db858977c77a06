//! Batch reader for access-log files
//!
//! Reads a closed log front to back in one pass, handing every line to the
//! parser and counting the ones that do not match.

use crate::input::parser;
use crate::models::LogEntry;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROGRESS_INTERVAL: usize = 10_000;

/// Fatal failures of a load. Unparseable lines are never reported here.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open log file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read log file {path:?} at line {line}: {source}")]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Line counters for one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub parsed_count: usize,
    pub invalid_count: usize,
}

/// Parsed entries in input order plus the counters that produced them
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub entries: Vec<LogEntry>,
    pub stats: ParseStats,
}

/// Reads newline-delimited access-log lines from a file
pub struct LogSource {
    path: PathBuf,
}

impl LogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LogSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and parse it to end of stream.
    pub fn load(&self) -> Result<LoadedLog, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::Open {
            path: self.path.clone(),
            source,
        })?;

        let loaded = Self::read_all(BufReader::new(file), &self.path)?;

        log::info!(
            "Parsed {:?}: {} lines, {} entries, {} invalid",
            self.path,
            loaded.stats.total_lines,
            loaded.stats.parsed_count,
            loaded.stats.invalid_count
        );

        Ok(loaded)
    }

    /// Parse from any buffered reader (stdin, in-memory buffers).
    pub fn from_reader<R: BufRead>(reader: R) -> Result<LoadedLog, SourceError> {
        Self::read_all(reader, Path::new("<reader>"))
    }

    fn read_all<R: BufRead>(mut reader: R, path: &Path) -> Result<LoadedLog, SourceError> {
        let mut loaded = LoadedLog::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let bytes_read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| SourceError::Read {
                    path: path.to_path_buf(),
                    line: loaded.stats.total_lines + 1,
                    source,
                })?;

            if bytes_read == 0 {
                break; // EOF
            }

            loaded.stats.total_lines += 1;

            // Invalid UTF-8 is replaced rather than aborting the scan
            let line = String::from_utf8_lossy(&buf);
            match parser::parse_line(&line) {
                Some(entry) => {
                    loaded.entries.push(entry);
                    loaded.stats.parsed_count += 1;
                }
                None => loaded.stats.invalid_count += 1,
            }

            if loaded.stats.total_lines % PROGRESS_INTERVAL == 0 {
                log::debug!("Processed {} lines...", loaded.stats.total_lines);
            }
        }

        Ok(loaded)
    }
}
