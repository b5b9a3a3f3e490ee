use std::path::PathBuf;

use clap::Args;

use crate::gitleaks::DEFAULT_REPORT_FILE;

/// Arguments for scanning a directory and presenting the findings
#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "Scan Options")]
pub struct ScanArgs {
    /// Directory to scan. Defaults to the current working directory
    #[arg(long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Name of the raw gitleaks report, created inside the scanned directory
    #[arg(long = "output_filename", value_name = "NAME", default_value = DEFAULT_REPORT_FILE)]
    pub output_filename: String,

    /// Print the findings to the terminal after the scan (default)
    #[arg(long = "show_result", overrides_with = "no_show_result")]
    pub show_result: bool,

    /// Do not print the findings to the terminal
    #[arg(long = "no-show_result")]
    pub no_show_result: bool,

    /// Validate findings against the strict report schema before printing (default)
    #[arg(long = "bonus", overrides_with = "no_bonus")]
    pub bonus: bool,

    /// Print findings as plain JSON objects, skipping schema validation
    #[arg(long = "no-bonus")]
    pub no_bonus: bool,

    /// Program used to launch gitleaks
    #[arg(long = "gitleaks-command", value_name = "CMD", default_value = "gitleaks")]
    pub gitleaks_command: String,
}

impl ScanArgs {
    /// True unless `--no-show_result` won.
    pub fn show_results_enabled(&self) -> bool {
        self.show_result || !self.no_show_result
    }

    /// True unless `--no-bonus` won.
    pub fn bonus_enabled(&self) -> bool {
        self.bonus || !self.no_bonus
    }
}
