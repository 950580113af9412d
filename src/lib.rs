//! Library entry point for query-tester components.
//!
//! Exposes the extraction and execution engines (plus configuration, backends
//! and reporting) so integration tests and other tools can drive them without
//! going through the binary entry point.

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod report;
pub mod runner;

pub use backend::{Backend, BackendFamily, Connection};
pub use config::{ConnectionConfig, TestSettings};
pub use error::{BackendError, QueryTesterError, Result, Stage};
pub use models::{ExecResult, ExecutionAttempt, Query, QueryResult, RunSummary};
