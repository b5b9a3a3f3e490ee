use clap::{ArgAction, Args, Parser};

use crate::cli::scan::ScanArgs;

#[deny(missing_docs)]
#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
/// Leakwrap - Scan a directory for leaked secrets with gitleaks and normalize the findings
pub struct CommandLineArgs {
    /// Arguments controlling the scan and its presentation
    #[command(flatten)]
    pub scan_args: ScanArgs,

    /// Global arguments
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

impl CommandLineArgs {
    /// Parse command-line arguments.
    ///
    /// Usage errors are returned instead of exiting so the caller can record
    /// them in the error report file before terminating.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

/// Top-level global CLI arguments
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Global Options")]
pub struct GlobalArgs {
    /// Enable verbose output (up to 3 times for more detail)
    #[arg(long = "verbose", short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error messages
    #[arg(long, short)]
    pub quiet: bool,
}
