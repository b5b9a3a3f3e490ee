pub mod cli;
pub mod errors;
pub mod gitleaks;
pub mod presenter;
pub mod process;
pub mod report;
pub mod util;
