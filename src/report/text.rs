//! Human-readable output.
//!
//! Functions return strings so callers decide where they go; colouring is
//! controlled globally through `colored::control`.

use std::fmt::Write;
use std::time::Duration;

use colored::Colorize;

use crate::config::TestSettings;
use crate::models::{Query, QueryResult, RunSummary};

/// Longest statement preview printed per query.
const MAX_PREVIEW_CHARS: usize = 120;

pub fn render_listing(queries: &[Query]) -> String {
    let mut out = String::new();
    for (idx, query) in queries.iter().enumerate() {
        let _ = writeln!(out, "{} {}", format!("Query {}:", idx + 1).bold(), location(query));
        for line in query.comment().lines() {
            let _ = writeln!(out, "  {}", format!("-- {}", line).dimmed());
        }
        for line in query.text().lines() {
            let _ = writeln!(out, "  {}", line);
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{} queries found", queries.len());
    out
}

pub fn render_header(settings: &TestSettings, query_count: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Target:       {}", settings.connection);
    let _ = writeln!(out, "  Path:         {}", settings.path.display());
    let _ = writeln!(out, "  Queries:      {}", query_count);
    let _ = writeln!(out, "  Repetitions:  {}", settings.repetitions);
    out
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let total = summary.results.len();

    for (idx, result) in summary.results.iter().enumerate() {
        render_result(&mut out, idx + 1, total, result);
    }

    let passed = summary.results.iter().filter(|r| r.all_succeeded()).count();
    let failed = total - passed;

    let _ = writeln!(out, "════════════════════════════════════════════════");
    let _ = writeln!(
        out,
        "  Completed {} queries ({} attempts) in {:.2}s",
        summary.total_queries,
        summary.total_attempts,
        summary.elapsed.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "  Passed: {}  Failed: {}  Failed attempts: {}",
        passed.to_string().green(),
        if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().normal()
        },
        summary.total_failures
    );
    if let Some(fatal) = &summary.fatal {
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            "Run aborted".red().bold(),
            fatal.stage,
            fatal.message
        );
    }
    let _ = writeln!(out, "════════════════════════════════════════════════");
    out
}

fn render_result(out: &mut String, n: usize, total: usize, result: &QueryResult) {
    let query = &result.query;
    let _ = writeln!(out, "[{}/{}] {}", n, total, location(query));
    if let Some(first) = query.comment().lines().next() {
        let _ = writeln!(out, "  {}", format!("-- {}", first).dimmed());
    }
    let _ = writeln!(out, "  {}", preview(query.text()));

    let attempts = result.attempts.len();
    let stats = format!(
        "mean={}  min={}  max={}",
        fmt_duration(result.mean_duration),
        fmt_duration(result.min_duration),
        fmt_duration(result.max_duration)
    );
    if result.all_succeeded() {
        let _ = writeln!(
            out,
            "  {} {}/{} ok  {}",
            "✅".green(),
            result.success_count,
            attempts,
            stats
        );
    } else {
        let _ = writeln!(
            out,
            "  {} {}/{} ok  {}",
            "❌".red(),
            result.success_count,
            attempts,
            stats
        );
        for attempt in &result.attempts {
            if let Some(detail) = attempt.error_detail() {
                let _ = writeln!(out, "     attempt {}: {}", attempt.attempt, detail.red());
            }
        }
    }
    let _ = writeln!(out);
}

fn location(query: &Query) -> String {
    let source = query.source();
    let mut loc = format!("{}:{}", source.file.display(), source.line);
    if source.unterminated {
        loc.push_str(&format!(" {}", "(unterminated)".yellow()));
    }
    loc
}

/// Single-line, truncated statement text.
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_PREVIEW_CHARS {
        flat
    } else {
        let head: String = flat.chars().take(MAX_PREVIEW_CHARS - 3).collect();
        format!("{}...", head)
    }
}

fn fmt_duration(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{}µs", us)
    } else if us < 1_000_000 {
        format!("{:.2}ms", us as f64 / 1_000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("SELECT *\n  FROM t;"), "SELECT * FROM t;");
        let long = format!("SELECT {} FROM t;", "x, ".repeat(100));
        let p = preview(&long);
        assert_eq!(p.chars().count(), MAX_PREVIEW_CHARS);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(fmt_duration(Duration::from_micros(1_500)), "1.50ms");
        assert_eq!(fmt_duration(Duration::from_millis(2_500)), "2.50s");
    }
}
