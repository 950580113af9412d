//! Shared helpers for integration tests: a scripted in-memory backend.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use query_tester::backend::{Backend, BackendFamily, Connection};
use query_tester::extract::{extract_str, Dialect};
use query_tester::{BackendError, ConnectionConfig, ExecResult, Query};

pub const TEST_PASSWORD: &str = "super-secret-pw";

/// Decides the outcome of an execution from the SQL text and how many times
/// that text has been executed so far (1-based, across reconnects).
///
/// A statement error mentioning "timed out" closes the scripted session, the
/// way the MySQL adapter abandons a session after a statement timeout.
pub type ExecScript = Arc<dyn Fn(&str, u32) -> Result<ExecResult, BackendError> + Send + Sync>;

#[derive(Default)]
struct Shared {
    executed: Mutex<Vec<String>>,
    calls: Mutex<HashMap<String, u32>>,
    connects: AtomicU32,
    closes: AtomicU32,
}

pub struct ScriptedBackend {
    connect_outcomes: Mutex<VecDeque<Result<(), BackendError>>>,
    script: ExecScript,
    shared: Arc<Shared>,
}

impl ScriptedBackend {
    pub fn new(script: ExecScript) -> Self {
        Self {
            connect_outcomes: Mutex::new(VecDeque::new()),
            script,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Every statement succeeds.
    pub fn always_ok() -> Self {
        Self::new(Arc::new(|_, _| Ok(ExecResult::default())))
    }

    /// Outcomes for successive `connect` calls; once exhausted connects succeed.
    pub fn with_connects(self, outcomes: Vec<Result<(), BackendError>>) -> Self {
        *self.connect_outcomes.lock().unwrap() = outcomes.into();
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.shared.executed.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.shared.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> u32 {
        self.shared.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn family(&self) -> BackendFamily {
        BackendFamily::MySql
    }

    async fn connect(&self, _config: &ConnectionConfig) -> Result<Box<dyn Connection>, BackendError> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .connect_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        outcome?;

        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            shared: self.shared.clone(),
            open: true,
            closed: false,
        }))
    }
}

struct ScriptedConnection {
    script: ExecScript,
    shared: Arc<Shared>,
    open: bool,
    closed: bool,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn ping(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> Result<ExecResult, BackendError> {
        if !self.open {
            return Err(BackendError::Connection("connection is closed".into()));
        }
        self.shared.executed.lock().unwrap().push(sql.to_string());
        let n = {
            let mut calls = self.shared.calls.lock().unwrap();
            let n = calls.entry(sql.to_string()).or_insert(0);
            *n += 1;
            *n
        };
        let outcome = (self.script)(sql, n);
        if let Err(BackendError::Statement(msg)) = &outcome {
            if msg.contains("timed out") {
                self.open = false;
            }
        }
        outcome
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if !self.closed {
            self.closed = true;
            self.open = false;
            self.shared.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        host: "db.test".to_string(),
        port: 3306,
        user: "tester".to_string(),
        password: TEST_PASSWORD.to_string(),
        database: "shop".to_string(),
        family: BackendFamily::MySql,
        connect_timeout: Duration::from_secs(1),
        statement_timeout: None,
    }
}

/// Queries extracted from inline SQL.
pub fn queries(content: &str) -> Vec<Query> {
    extract_str(content, &Dialect::mysql(), Path::new("inline.sql"))
}
