use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::TestSettings;
use crate::models::{Query, RunSummary};

/// Persisted form of one `test` run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub version: &'a str,
    pub timestamp: String,
    /// Connection target without credentials
    pub target: String,
    pub path: String,
    pub repetitions: u32,
    pub summary: &'a RunSummary,
}

impl<'a> RunReport<'a> {
    pub fn new(summary: &'a RunSummary, settings: &TestSettings) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
            target: settings.connection.to_string(),
            path: settings.path.display().to_string(),
            repetitions: settings.repetitions.get(),
            summary,
        }
    }
}

pub fn render_listing(queries: &[Query]) -> Result<String, String> {
    serde_json::to_string_pretty(queries).map_err(|e| format!("Serialize error: {}", e))
}

pub fn render_report(report: &RunReport<'_>) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("Serialize error: {}", e))
}

/// Write a JSON report to `output_dir` and return the file path.
pub fn write_json_report(report: &RunReport<'_>, output_dir: &Path) -> Result<String, String> {
    fs::create_dir_all(output_dir).map_err(|e| format!("Failed to create output dir: {}", e))?;

    let filename = format!(
        "query-test-{}.json",
        chrono::Utc::now().format("%Y-%m-%d-%H%M%S")
    );
    let path = output_dir.join(filename);

    let json = render_report(report)?;
    fs::write(&path, &json).map_err(|e| format!("Write error: {}", e))?;

    Ok(path.display().to_string())
}
