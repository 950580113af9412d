//! Run configuration
//!
//! Values come from three layers, highest precedence first: command line
//! (including `QUERY_TESTER_*` environment variables), an optional TOML file,
//! built-in defaults.
//!
//! # Configuration Format
//!
//! ```toml
//! [connection]
//! host = "db.internal"
//! port = 3306
//! user = "tester"
//! password = "secret"
//! database = "shop"
//! type = "mysql"
//! connect_timeout_secs = 5
//! statement_timeout_secs = 30
//!
//! [run]
//! path = "queries"
//! repetitions = 3
//! ```

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendFamily;
use crate::error::{QueryTesterError, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 42069;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PASSWORD: &str = "password";
pub const DEFAULT_PATH: &str = "queries";
pub const DEFAULT_DATABASE: &str = "table";
pub const DEFAULT_BACKEND: &str = "mysql";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Everything needed to open a connection.
///
/// `Debug` and `Display` never print the password.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub family: BackendFamily,
    pub connect_timeout: Duration,
    pub statement_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Replace every occurrence of the password in `message`.
    pub fn redact(&self, message: &str) -> String {
        if self.password.is_empty() {
            message.to_string()
        } else {
            message.replace(&self.password, "****")
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .field("family", &self.family)
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}@{}:{}/{}",
            self.family, self.user, self.host, self.port, self.database
        )
    }
}

/// Settings of one `test` invocation.
#[derive(Debug, Clone)]
pub struct TestSettings {
    pub connection: ConnectionConfig,
    pub path: PathBuf,
    pub repetitions: NonZeroU32,
}

/// Optional TOML configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub connection: ConnectionSection,
    #[serde(default)]
    pub run: RunSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    #[serde(rename = "type")]
    pub backend: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub statement_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    pub path: Option<PathBuf>,
    pub repetitions: Option<u32>,
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryTesterError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Command-line values; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub backend: Option<String>,
    pub path: Option<PathBuf>,
    pub repetitions: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub statement_timeout_secs: Option<u64>,
}

impl TestSettings {
    /// Merge command line over file over defaults.
    ///
    /// Fails on an unknown backend type or zero repetitions, before any I/O.
    pub fn resolve(cli: Overrides, file: FileConfig) -> Result<Self> {
        let conn = file.connection;

        let backend = cli
            .backend
            .or(conn.backend)
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string());
        let family: BackendFamily = backend.parse()?;

        let repetitions = cli.repetitions.or(file.run.repetitions).unwrap_or(1);
        let repetitions = NonZeroU32::new(repetitions)
            .ok_or_else(|| QueryTesterError::config("repetitions must be at least 1"))?;

        let connect_timeout = cli
            .connect_timeout_secs
            .or(conn.connect_timeout_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let statement_timeout = cli
            .statement_timeout_secs
            .or(conn.statement_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let connection = ConnectionConfig {
            host: cli
                .host
                .or(conn.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(conn.port).unwrap_or(DEFAULT_PORT),
            user: cli
                .user
                .or(conn.user)
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: cli
                .password
                .or(conn.password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            database: cli
                .database
                .or(conn.database)
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            family,
            connect_timeout: Duration::from_secs(connect_timeout),
            statement_timeout,
        };

        Ok(Self {
            connection,
            path: cli
                .path
                .or(file.run.path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH)),
            repetitions,
        })
    }
}
