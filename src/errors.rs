use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{process::CommandError, util};

/// Fixed name of the structured error report, written to the working
/// directory whenever a run fails.
pub const ERROR_FILE: &str = "error.json";

/// Fatal failures of the scan pipeline.
///
/// Every variant maps to a process exit code through [`ScanError::exit_code`];
/// only the outermost entry point turns one of these into an actual exit.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The requested scan directory does not exist.
    #[error("The directory {dir} does not exist.", dir = .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The scanner could not be launched at all.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The scanner ran and reported a failure of its own.
    #[error("{}", scan_failure_message(.code, .stderr))]
    ScanFailed { code: i32, stderr: String },

    /// The scanner exited successfully but left no report behind.
    #[error("report file not found: {path}", path = .path.display())]
    ReportNotFound { path: PathBuf },

    /// The report exists but is not valid JSON in a known shape.
    #[error("malformed JSON in report file {path}: {err}", path = .path.display(), err = .source)]
    ReportMalformed { path: PathBuf, source: serde_json::Error },

    /// A finding failed strict schema validation. Positions are 1-based to
    /// match the numbering of presented results.
    #[error("invalid finding at position {position}: {reason}")]
    InvalidFinding { position: usize, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScanError {
    /// Process exit code for this failure.
    ///
    /// Malformed report JSON is the only class with a dedicated code (3);
    /// scanner failures forward the scanner's own exit code verbatim and
    /// everything else is a generic failure (2).
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::ScanFailed { code, .. } => *code,
            ScanError::ReportMalformed { .. } => 3,
            ScanError::DirectoryNotFound { .. }
            | ScanError::Command(_)
            | ScanError::ReportNotFound { .. }
            | ScanError::InvalidFinding { .. }
            | ScanError::Other(_) => 2,
        }
    }
}

fn scan_failure_message(code: &i32, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        format!("gitleaks scan failed with exit code {code}")
    } else {
        stderr.to_owned()
    }
}

/// Structured record persisted to [`ERROR_FILE`] for any fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub exit_code: i32,
    pub error_message: String,
}

impl ErrorRecord {
    pub fn new(exit_code: i32, error_message: impl Into<String>) -> Self {
        ErrorRecord { exit_code, error_message: error_message.into() }
    }

    pub fn from_error(err: &ScanError) -> Self {
        ErrorRecord::new(err.exit_code(), err.to_string())
    }
}

/// Writes `record` to `path` as 4-space-indented JSON, replacing any record
/// from a previous run.
///
/// A failure to write is itself reported on stderr instead of propagating,
/// so the original fault stays the one the process exits with.
pub fn write_error_record(record: &ErrorRecord, path: &Path) {
    match util::write_json_pretty(path, record) {
        Ok(()) => info!("error details written to {}", path.display()),
        Err(err) => eprintln!("failed to write error report to {}: {err}", path.display()),
    }
}
