// Logging module, powered by tracing-subscriber
//
// Diagnostics go to stderr so stdout stays reserved for reports.
// A compatibility bridge (`tracing_log::LogTracer`) captures `log::*` records
// emitted by dependencies and routes them through the same subscriber.

use clap::ValueEnum;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    #[default]
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

/// Base level for a `-v` count.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the `EnvFilter`: `RUST_LOG` wins when set, otherwise the base level
/// plus caps on chatty driver crates.
fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![level.to_string()];

    let noisy: &[(&str, &str)] = &[("mysql_async", "warn"), ("mysql_common", "warn")];
    for (target, lvl) in noisy {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Initialize logging.
///
/// Installs a single stderr layer (compact text or JSON lines) with span
/// close events, so each per-query span reports its elapsed time.
pub fn init_logging(verbose: u8, format: LogFormat) -> anyhow::Result<()> {
    let level = level_for_verbosity(verbose);

    let layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_span_list(true)
            .with_filter(build_env_filter(level)?)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(build_env_filter(level)?)
            .boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layer))
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    // Bridge `log` crate → tracing; ok() in case already initialized
    tracing_log::LogTracer::init().ok();

    tracing::trace!("Logging initialized: level={}, format={:?}", level, format);

    Ok(())
}
