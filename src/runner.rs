use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::backend::{Backend, Connection};
use crate::config::ConnectionConfig;
use crate::error::Stage;
use crate::models::{ExecutionAttempt, FatalError, Query, QueryResult, RunSummary};

/// Detail recorded for attempts that never ran because the connection dropped.
const SKIPPED_AFTER_CONNECTION_LOSS: &str = "skipped: connection lost during an earlier attempt";

/// Upper bound on the attempts vector preallocation.
const MAX_PREALLOCATED_ATTEMPTS: usize = 1024;

/// Runs every query `reps` times, in order, on one connection.
///
/// Never returns early with an error: a failed initial connect or a failed
/// reconnect ends up in [`RunSummary::fatal`] next to whatever was gathered.
pub async fn run(
    queries: &[Query],
    backend: &dyn Backend,
    config: &ConnectionConfig,
    reps: NonZeroU32,
) -> RunSummary {
    let started = Instant::now();

    let mut conn = match backend.connect(config).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(server = %config, error = %e, "initial connection failed");
            return RunSummary::new(
                Vec::new(),
                started.elapsed(),
                Some(FatalError {
                    stage: Stage::Connection,
                    message: config.redact(e.message()),
                }),
            );
        }
    };

    let total = queries.len();
    let mut results = Vec::with_capacity(total);
    let mut fatal = None;

    for (idx, query) in queries.iter().enumerate() {
        let span = tracing::info_span!(
            "query",
            n = idx + 1,
            file = %query.source().file.display(),
            line = query.source().line
        );
        let (attempts, lost) = run_attempts(&mut *conn, query, reps, config)
            .instrument(span)
            .await;

        if lost {
            tracing::warn!("connection lost, reconnecting once");
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "error while closing lost connection");
            }
            match backend.connect(config).await {
                Ok(fresh) => conn = fresh,
                Err(e) => {
                    tracing::error!(error = %e, "reconnect failed, stopping run");
                    results.push(QueryResult::from_attempts(query.clone(), attempts));
                    fatal = Some(FatalError {
                        stage: Stage::Execution,
                        message: format!(
                            "connection lost and reconnect failed: {}",
                            config.redact(e.message())
                        ),
                    });
                    break;
                }
            }
        }

        let result = QueryResult::from_attempts(query.clone(), attempts);
        tracing::info!(
            ok = result.success_count,
            failed = result.failure_count,
            mean_us = result.mean_duration.as_micros() as u64,
            "[{}/{}] done",
            idx + 1,
            total
        );
        results.push(result);
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "error while closing connection");
    }

    RunSummary::new(results, started.elapsed(), fatal)
}

/// All attempts of one query. The flag is set when a connection-level error,
/// or a statement error that cost the session, cut the attempts short; the
/// remaining ones are recorded as failures.
async fn run_attempts(
    conn: &mut dyn Connection,
    query: &Query,
    reps: NonZeroU32,
    config: &ConnectionConfig,
) -> (Vec<ExecutionAttempt>, bool) {
    let reps = reps.get();
    let mut attempts = Vec::with_capacity((reps as usize).min(MAX_PREALLOCATED_ATTEMPTS));

    for attempt in 1..=reps {
        let start = Instant::now();
        let outcome = conn.execute(query.text()).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(result) => {
                tracing::debug!(attempt, elapsed_us = elapsed.as_micros() as u64, "ok");
                attempts.push(ExecutionAttempt::success(attempt, elapsed, result));
            }
            Err(e) => {
                let detail = config.redact(&e.to_string());
                tracing::debug!(attempt, error = %detail, "failed");
                attempts.push(ExecutionAttempt::failure(attempt, elapsed, detail));

                // a statement timeout leaves the adapter without a session
                if e.is_connection_level() || !conn.is_open() {
                    for skipped in attempt + 1..=reps {
                        attempts.push(ExecutionAttempt::failure(
                            skipped,
                            Duration::ZERO,
                            SKIPPED_AFTER_CONNECTION_LOSS,
                        ));
                    }
                    return (attempts, true);
                }
            }
        }
    }

    (attempts, false)
}
