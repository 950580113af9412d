use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::Stage;

/// Where a query came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub file: PathBuf,
    /// 1-based line of the statement's first line
    pub line: usize,
    /// End of input was reached before a `;`
    pub unterminated: bool,
}

/// A single statement extracted from a query file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    comment: String,
    text: String,
    source: Provenance,
}

impl Query {
    /// Only the extraction engine builds queries, so the statement-start
    /// invariant on `text` holds by construction.
    pub(crate) fn new(comment: String, text: String, source: Provenance) -> Self {
        Self {
            comment,
            text,
            source,
        }
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &Provenance {
        &self.source
    }

    pub fn is_unterminated(&self) -> bool {
        self.source.unterminated
    }
}

/// What the database returned for one successful execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub rows_returned: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success {
        rows_affected: u64,
        rows_returned: u64,
    },
    Error {
        detail: String,
    },
}

/// One run of one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionAttempt {
    /// 1-based
    pub attempt: u32,
    #[serde(rename = "duration_us", serialize_with = "as_micros")]
    pub duration: Duration,
    pub outcome: AttemptOutcome,
}

impl ExecutionAttempt {
    pub fn success(attempt: u32, duration: Duration, result: ExecResult) -> Self {
        Self {
            attempt,
            duration,
            outcome: AttemptOutcome::Success {
                rows_affected: result.rows_affected,
                rows_returned: result.rows_returned,
            },
        }
    }

    pub fn failure(attempt: u32, duration: Duration, detail: impl Into<String>) -> Self {
        Self {
            attempt,
            duration,
            outcome: AttemptOutcome::Error {
                detail: detail.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Error { detail } => Some(detail),
            AttemptOutcome::Success { .. } => None,
        }
    }
}

/// A query plus all of its attempts and the aggregates derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: Query,
    pub attempts: Vec<ExecutionAttempt>,
    pub success_count: u32,
    pub failure_count: u32,
    #[serde(rename = "mean_us", serialize_with = "as_micros")]
    pub mean_duration: Duration,
    #[serde(rename = "min_us", serialize_with = "as_micros")]
    pub min_duration: Duration,
    #[serde(rename = "max_us", serialize_with = "as_micros")]
    pub max_duration: Duration,
}

impl QueryResult {
    pub fn from_attempts(query: Query, attempts: Vec<ExecutionAttempt>) -> Self {
        let success_count = attempts.iter().filter(|a| a.is_success()).count() as u32;
        let failure_count = attempts.len() as u32 - success_count;

        let total: Duration = attempts.iter().map(|a| a.duration).sum();
        let mean_duration = if attempts.is_empty() {
            Duration::ZERO
        } else {
            total / attempts.len() as u32
        };
        let min_duration = attempts
            .iter()
            .map(|a| a.duration)
            .min()
            .unwrap_or_default();
        let max_duration = attempts
            .iter()
            .map(|a| a.duration)
            .max()
            .unwrap_or_default();

        Self {
            query,
            attempts,
            success_count,
            failure_count,
            mean_duration,
            min_duration,
            max_duration,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }
}

/// Error that ended a run early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FatalError {
    pub stage: Stage,
    pub message: String,
}

/// Everything one run of the execution engine produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub results: Vec<QueryResult>,
    pub total_queries: u32,
    pub total_attempts: u32,
    pub total_failures: u32,
    #[serde(rename = "elapsed_us", serialize_with = "as_micros")]
    pub elapsed: Duration,
    pub fatal: Option<FatalError>,
}

impl RunSummary {
    pub fn new(results: Vec<QueryResult>, elapsed: Duration, fatal: Option<FatalError>) -> Self {
        let total_queries = results.len() as u32;
        let total_attempts = results.iter().map(|r| r.attempts.len() as u32).sum();
        let total_failures = results.iter().map(|r| r.failure_count).sum();

        Self {
            results,
            total_queries,
            total_attempts,
            total_failures,
            elapsed,
            fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }
}

fn as_micros<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_micros() as u64)
}
