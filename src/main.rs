use std::path::Path;

use anyhow::Context;
use clap::error::ErrorKind;
use leakwrap::{
    cli::{CommandLineArgs, GlobalArgs},
    errors::{self, ErrorRecord, ScanError},
    gitleaks::{self, Gitleaks, ScanResult},
    presenter,
    process::ProcessOutcome,
    report,
};
use tracing::error;
use tracing_core::metadata::LevelFilter;
use tracing_subscriber::{
    self, fmt, prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
};

fn main() {
    color_backtrace::install();
    // Parse command-line arguments
    let args = match CommandLineArgs::parse_args() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version keep clap's ordinary exit path; a real
            // usage error is recorded before clap terminates the process
            if !matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let record = ErrorRecord::new(2, format!("Gitleaks scan failed: {err}"));
                errors::write_error_record(&record, Path::new(errors::ERROR_FILE));
            }
            err.exit();
        }
    };
    setup_logging(&args.global_args);

    match run(&args) {
        Ok(outcome) => std::process::exit(determine_exit_code(&outcome)),
        Err(err) => {
            error!("{err}");
            let record = ErrorRecord::from_error(&err);
            errors::write_error_record(&record, Path::new(errors::ERROR_FILE));
            std::process::exit(err.exit_code());
        }
    }
}

fn setup_logging(global_args: &GlobalArgs) {
    // Determine log level based on global verbosity
    let (level, all_targets) = if global_args.quiet {
        (LevelFilter::ERROR, false)
    } else {
        let level = match global_args.verbose {
            0 => LevelFilter::INFO,  // Default level if no `-v` is provided
            1 => LevelFilter::DEBUG, // `-v`
            _ => LevelFilter::TRACE, // `-vv` or more
        };
        let all_targets = global_args.verbose > 2; // Enable all targets for `-vvv` or more
        (level, all_targets)
    };
    // Create a filter for logging
    let filter = if all_targets {
        tracing_subscriber::filter::Targets::new().with_default(LevelFilter::TRACE)
    } else {
        tracing_subscriber::filter::Targets::new()
            .with_default(LevelFilter::ERROR)
            .with_target("leakwrap", level)
    };
    // Configure the formatter layer
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .without_time();
    registry().with(fmt_layer).with(filter).init();
}

/// Exit code for a run whose scan finished with code 0 or 1.
///
/// Scanner exit codes outside {0, 1} never reach this function; they fail
/// the pipeline as [`ScanError::ScanFailed`].
fn determine_exit_code(outcome: &ProcessOutcome) -> i32 {
    // exit with code 1 if the scanner reported leaks
    // exit with code 0 if the scanned directory is clean
    match ScanResult::from_exit_code(outcome.exit_code) {
        ScanResult::Clean => 0,
        ScanResult::LeaksFound => 1,
        ScanResult::Error { code } => code,
    }
}

fn run(args: &CommandLineArgs) -> Result<ProcessOutcome, ScanError> {
    let scan_args = &args.scan_args;
    let directory = match &scan_args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .context("failed to resolve the current working directory")?,
    };

    gitleaks::clean_report_file(&directory.join(&scan_args.output_filename));

    let scanner = Gitleaks::new(scan_args.gitleaks_command.as_str());
    let outcome = scanner.scan(&directory, &scan_args.output_filename)?;

    let findings = report::normalize(&directory, &scan_args.output_filename, true)?;

    if scan_args.show_results_enabled() {
        presenter::present(std::io::stdout().lock(), &findings, scan_args.bonus_enabled())?;
    }
    Ok(outcome)
}
