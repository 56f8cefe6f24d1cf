//! Append-only local result log
//!
//! One JSON record per line. This log is the record of truth: a failed write
//! is reported to the caller and never swallowed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::ResultRecord;
use crate::{RaceError, Result};

/// Destination for finished-driver lines.
pub trait ResultLog: Send {
    fn append(&mut self, line: &str) -> Result<()>;
}

/// Result log backed by a file opened in append mode.
#[derive(Debug, Clone)]
pub struct LocalLog {
    path: PathBuf,
}

impl LocalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the log at `path`, in write order.
    ///
    /// Lines that do not parse are skipped with a warning.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<ResultRecord>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RaceError::local_log_error(path.to_path_buf(), e))?;

        let mut records = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ResultRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping line {} of {}: {}", number + 1, path.display(), e),
            }
        }
        Ok(records)
    }
}

impl ResultLog for LocalLog {
    fn append(&mut self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RaceError::local_log_error(self.path.clone(), e))?;

        writeln!(file, "{}", line)
            .and_then(|_| file.sync_data())
            .map_err(|e| RaceError::local_log_error(self.path.clone(), e))?;

        debug!("Appended result to {}", self.path.display());
        Ok(())
    }
}
