//! MySQL adapter over `mysql_async`.

use std::time::Instant;

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, DriverError, OptsBuilder, Row};

use super::{Backend, BackendFamily, Connection};
use crate::config::ConnectionConfig;
use crate::error::BackendError;
use crate::models::ExecResult;

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlBackend;

impl MySqlBackend {
    pub fn new() -> Self {
        Self
    }

    fn opts(config: &ConnectionConfig) -> OptsBuilder {
        OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
    }
}

#[async_trait]
impl Backend for MySqlBackend {
    fn family(&self) -> BackendFamily {
        BackendFamily::MySql
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, BackendError> {
        tracing::debug!(server = %config, "opening mysql connection");
        let started = Instant::now();

        let conn = match tokio::time::timeout(config.connect_timeout, Conn::new(Self::opts(config))).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(BackendError::Connection(config.redact(&e.to_string()))),
            Err(_) => {
                return Err(BackendError::Connection(format!(
                    "timed out after {}s connecting to {}:{}",
                    config.connect_timeout.as_secs(),
                    config.host,
                    config.port
                )))
            }
        };

        let mut connection = MySqlConnection {
            conn: Some(conn),
            config: config.clone(),
        };
        connection.ping().await?;

        tracing::info!(
            server = %config,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "connected"
        );
        Ok(Box::new(connection))
    }
}

/// One `mysql_async` session. `conn` is `None` once closed or abandoned
/// after a statement timeout.
pub struct MySqlConnection {
    conn: Option<Conn>,
    config: ConnectionConfig,
}

impl MySqlConnection {
    fn translate(&self, err: mysql_async::Error) -> BackendError {
        let message = self.config.redact(&err.to_string());
        match err {
            mysql_async::Error::Io(_) | mysql_async::Error::Driver(DriverError::ConnectionClosed) => {
                BackendError::Connection(message)
            }
            _ => BackendError::Statement(message),
        }
    }

    fn live(&mut self) -> Result<&mut Conn, BackendError> {
        self.conn
            .as_mut()
            .ok_or_else(|| BackendError::Connection("connection is closed".to_string()))
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn ping(&mut self) -> Result<(), BackendError> {
        let result = self.live()?.ping().await;
        result.map_err(|e| BackendError::Connection(self.config.redact(&e.to_string())))
    }

    async fn execute(&mut self, sql: &str) -> Result<ExecResult, BackendError> {
        let statement_timeout = self.config.statement_timeout;
        let conn = self.live()?;

        let run = async move {
            let result = conn.query_iter(sql).await?;
            let rows_affected = result.affected_rows();
            let rows: Vec<Row> = result.collect_and_drop().await?;
            Ok::<_, mysql_async::Error>(ExecResult {
                rows_affected,
                rows_returned: rows.len() as u64,
            })
        };

        let outcome = match statement_timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    // the session is mid-statement; the next call must reconnect
                    self.conn = None;
                    return Err(BackendError::Statement(format!(
                        "statement timed out after {}s",
                        limit.as_secs()
                    )));
                }
            },
            None => run.await,
        };

        outcome.map_err(|e| self.translate(e))
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        match self.conn.take() {
            Some(conn) => conn
                .disconnect()
                .await
                .map_err(|e| BackendError::Connection(self.config.redact(&e.to_string()))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(port: u16) -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port,
            user: "root".to_string(),
            password: "s3cr3t-pass".to_string(),
            database: "table".to_string(),
            family: BackendFamily::MySql,
            connect_timeout: Duration::from_secs(2),
            statement_timeout: None,
        }
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // nothing listens on port 1
        let err = MySqlBackend::new()
            .connect(&config(1))
            .await
            .err()
            .expect("connect must fail");
        assert!(err.is_connection_level());
        assert!(!err.to_string().contains("s3cr3t-pass"));
    }

    #[tokio::test]
    async fn test_abandoned_session_reports_closed() {
        let mut conn = MySqlConnection {
            conn: None,
            config: config(3306),
        };
        assert!(!conn.is_open());

        let err = conn.execute("SELECT 1;").await.unwrap_err();
        assert!(err.is_connection_level());
        assert!(conn.close().await.is_ok());
    }
}
