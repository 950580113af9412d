//! Error types for query-tester
//!
//! Every fatal error carries the [`Stage`] it happened in so the binary can
//! print a diagnostic naming it. Statement-level failures never reach this
//! type: the runner records them as failed attempts.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for query-tester operations
pub type Result<T> = std::result::Result<T, QueryTesterError>;

/// Pipeline stage a fatal error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Configuration,
    Connection,
    Execution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "extraction",
            Stage::Configuration => "configuration",
            Stage::Connection => "connection",
            Stage::Execution => "execution",
        };
        f.write_str(name)
    }
}

/// Fatal errors surfaced to the caller.
#[derive(Error, Debug)]
pub enum QueryTesterError {
    /// A query path could not be inspected, listed or read.
    #[error("cannot read {}: {source}", .path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend family tag does not name a known adapter.
    #[error("unsupported backend type '{0}'")]
    UnsupportedBackend(String),

    /// Invalid configuration file or value.
    #[error("{0}")]
    Config(String),

    /// The database could not be reached.
    #[error("{message}")]
    Connection { stage: Stage, message: String },
}

impl QueryTesterError {
    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QueryTesterError::Path {
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        QueryTesterError::Config(msg.into())
    }

    /// Stage named in the process diagnostic.
    pub fn stage(&self) -> Stage {
        match self {
            QueryTesterError::Path { .. } => Stage::Extraction,
            QueryTesterError::UnsupportedBackend(_) | QueryTesterError::Config(_) => {
                Stage::Configuration
            }
            QueryTesterError::Connection { stage, .. } => *stage,
        }
    }
}

/// Errors produced by a database backend adapter.
///
/// The split matters to the runner: a `Connection` error during a run
/// triggers one reconnect, a `Statement` error is only recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Statement(String),
}

impl BackendError {
    pub fn is_connection_level(&self) -> bool {
        matches!(self, BackendError::Connection(_))
    }

    pub fn message(&self) -> &str {
        match self {
            BackendError::Connection(msg) | BackendError::Statement(msg) => msg,
        }
    }
}

impl From<toml::de::Error> for QueryTesterError {
    fn from(err: toml::de::Error) -> Self {
        QueryTesterError::Config(format!("TOML parse error: {}", err))
    }
}
