use std::process::{Command, Output, Stdio};

use tracing::debug;

/// Fixed token substituted for redacted substrings in logged command lines.
pub const REDACTION_MASK: &str = "[REDACTED]";

/// Represents errors that can occur when launching an external command.
///
/// A non-zero exit code is not one of them: that is a successful launch,
/// reported through [`ProcessOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("malformed command line: {0}")]
    Malformed(#[from] shell_words::ParseError),

    #[error("empty command line")]
    Empty,

    #[error("executable not found for command `{command}`: {source}")]
    LaunchFailure { command: String, source: std::io::Error },

    #[error("failed to execute command `{command}`: {source}")]
    ExecutionFailure { command: String, source: std::io::Error },
}

/// Captured result of a completed external command.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    fn from_output(output: Output) -> Self {
        ProcessOutcome {
            // code() is None when the child was killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Replaces every occurrence of each literal in `secrets` with
/// [`REDACTION_MASK`].
pub fn redact_command(command: &str, secrets: &[&str]) -> String {
    let mut redacted = command.to_owned();
    for secret in secrets {
        if secret.is_empty() {
            continue;
        }
        redacted = redacted.replace(secret, REDACTION_MASK);
    }
    redacted
}

/// Runs `command_line` without a shell, capturing both output streams and
/// the numeric exit code. Blocks until the child exits.
///
/// The command line is split with POSIX shell-word semantics before
/// invocation. Literal substrings listed in `redact` never reach the debug
/// log.
pub fn run_command(command_line: &str, redact: &[&str]) -> Result<ProcessOutcome, CommandError> {
    let argv = shell_words::split(command_line)?;
    let (program, args) = argv.split_first().ok_or(CommandError::Empty)?;

    debug!("running: {}", redact_command(command_line, redact));
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    let output = cmd.output().map_err(|source| {
        let command = redact_command(command_line, redact);
        if source.kind() == std::io::ErrorKind::NotFound {
            CommandError::LaunchFailure { command, source }
        } else {
            CommandError::ExecutionFailure { command, source }
        }
    })?;

    let outcome = ProcessOutcome::from_output(output);
    if !outcome.stdout.is_empty() {
        debug!("stdout:\n{}", outcome.stdout);
    }
    if !outcome.stderr.is_empty() {
        debug!("stderr:\n{}", outcome.stderr);
    }
    Ok(outcome)
}
