pub mod global;
pub mod scan;

pub use global::{CommandLineArgs, GlobalArgs};
