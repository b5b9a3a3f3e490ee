use std::{fs::File, path::Path};

use tracing::{debug, error, info, warn};

use crate::{
    errors::ScanError,
    process::{self, ProcessOutcome},
};

/// Default name of gitleaks' native report inside the scanned directory.
pub const DEFAULT_REPORT_FILE: &str = "output_test.json";

/// Classification of a finished gitleaks run by its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    Clean,
    LeaksFound,
    Error { code: i32 },
}

impl ScanResult {
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => ScanResult::Clean,
            1 => ScanResult::LeaksFound,
            code => ScanResult::Error { code },
        }
    }
}

/// A helper struct for running `gitleaks detect` against a directory.
pub struct Gitleaks {
    program: String,
}

impl Gitleaks {
    /// * `program`: the gitleaks executable to launch, typically `gitleaks`
    pub fn new(program: impl Into<String>) -> Self {
        Gitleaks { program: program.into() }
    }

    /// The exact command line `scan` launches, quoted for POSIX shells.
    fn command_line(&self, directory: &Path, output_filename: &str) -> String {
        let report_path = directory.join(output_filename).display().to_string();
        let source = directory.display().to_string();
        shell_words::join([
            self.program.as_str(),
            "detect",
            "--no-git",
            "--report-path",
            report_path.as_str(),
            "--source",
            source.as_str(),
        ])
    }

    /// Runs gitleaks against `directory`, letting it write its native report
    /// to `<directory>/<output_filename>`.
    ///
    /// Exit codes 0 (clean) and 1 (leaks found) are successful outcomes and
    /// return the captured [`ProcessOutcome`]. Any other exit code fails with
    /// [`ScanError::ScanFailed`] carrying that code and the stderr text. The
    /// directory is checked before any subprocess is spawned.
    pub fn scan(
        &self,
        directory: &Path,
        output_filename: &str,
    ) -> Result<ProcessOutcome, ScanError> {
        if !directory.is_dir() {
            return Err(ScanError::DirectoryNotFound { path: directory.to_path_buf() });
        }

        let report_path = directory.join(output_filename);
        let command = self.command_line(directory, output_filename);
        let outcome = process::run_command(&command, &[])?;

        match ScanResult::from_exit_code(outcome.exit_code) {
            ScanResult::Clean => {
                info!(
                    "Gitleaks scan completed successfully. No leaks found. Report saved at {}",
                    report_path.display()
                );
            }
            ScanResult::LeaksFound => {
                warn!(
                    "Gitleaks scan completed. Leaks detected. Report saved at {}",
                    report_path.display()
                );
            }
            ScanResult::Error { code } => {
                error!("Error occurred during Gitleaks scan. Return code: {code}");
                if !outcome.stderr.is_empty() {
                    error!("Error: {}", outcome.stderr);
                }
                return Err(ScanError::ScanFailed { code, stderr: outcome.stderr });
            }
        }
        Ok(outcome)
    }
}

/// Truncates (or creates) the report file so a previous run's findings can
/// never be read back as this scan's output. Failure is non-fatal and only
/// logged.
pub fn clean_report_file(path: &Path) {
    match File::create(path) {
        Ok(_) => debug!("cleaned previous report file at {}", path.display()),
        Err(err) => warn!("failed to clean report file {}: {err}", path.display()),
    }
}
