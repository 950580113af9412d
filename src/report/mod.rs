//! Rendering of extraction listings and run summaries.

pub mod json_reporter;
pub mod text;

use clap::ValueEnum;

/// Output format for both commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
