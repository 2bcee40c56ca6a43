//! CLI command implementations.

mod display;

pub mod check;
pub mod fix;

use clap::ValueEnum;

/// How `check` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, one line per finding
    Human,
    /// A single JSON document on stdout
    Json,
}
