//! Database backend adapters
//!
//! One [`Backend`] per database family. Extraction and execution only see
//! these traits, so adding a family means adding a module here and a variant
//! to [`BackendFamily`].

pub mod mysql;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::error::{BackendError, QueryTesterError};
use crate::models::ExecResult;

pub use mysql::MySqlBackend;

/// Supported database families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    MySql,
}

impl BackendFamily {
    pub fn tag(&self) -> &'static str {
        match self {
            BackendFamily::MySql => "mysql",
        }
    }
}

impl fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BackendFamily {
    type Err = QueryTesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(BackendFamily::MySql),
            _ => Err(QueryTesterError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Factory for live connections of one database family.
#[async_trait]
pub trait Backend: Send + Sync {
    fn family(&self) -> BackendFamily;

    /// Open a connection and ping it. A connection that cannot reach the
    /// server is an error here, never later.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, BackendError>;
}

/// A live database session.
#[async_trait]
pub trait Connection: Send {
    async fn ping(&mut self) -> Result<(), BackendError>;

    async fn execute(&mut self, sql: &str) -> Result<ExecResult, BackendError>;

    /// `false` once the session is gone, including after a statement error
    /// that forced the adapter to abandon it.
    fn is_open(&self) -> bool;

    /// Release the session. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<(), BackendError>;
}

/// Adapter for `family`.
pub fn backend_for(family: BackendFamily) -> Box<dyn Backend> {
    match family {
        BackendFamily::MySql => Box::new(MySqlBackend::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family() {
        assert_eq!("mysql".parse::<BackendFamily>().unwrap(), BackendFamily::MySql);
        assert_eq!(" MySQL ".parse::<BackendFamily>().unwrap(), BackendFamily::MySql);

        let err = "postgres".parse::<BackendFamily>().unwrap_err();
        assert!(matches!(err, QueryTesterError::UnsupportedBackend(ref t) if t == "postgres"));
    }

    #[test]
    fn test_backend_for_family() {
        assert_eq!(backend_for(BackendFamily::MySql).family(), BackendFamily::MySql);
    }
}
