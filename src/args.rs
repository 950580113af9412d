use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use query_tester::config::Overrides;
use query_tester::logging::LogFormat;
use query_tester::report::OutputFormat;

// Macro to create the version string at compile time
macro_rules! version_string {
    () => {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nCommit: ",
            env!("GIT_COMMIT_HASH"),
            " (",
            env!("GIT_BRANCH"),
            ")\nBuilt: ",
            env!("BUILD_DATE")
        )
    };
}

/// query-tester - run the SQL statements found in files against a database
#[derive(Parser, Debug)]
#[command(name = "query-tester")]
#[command(version = version_string!())]
#[command(about = "Extract SQL statements from files and test them against a live database", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format (logs go to stderr)
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract queries and execute each one against the database
    Test(TestArgs),

    /// Extract queries and print them without connecting
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Database host [default: localhost]
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Database port [default: 42069]
    #[arg(long = "port")]
    pub port: Option<u16>,

    /// Database user [default: root]
    #[arg(long = "user")]
    pub user: Option<String>,

    /// Database password [default: password]
    #[arg(long = "pass", env = "QUERY_TESTER_PASSWORD", hide_env_values = true)]
    pub pass: Option<String>,

    /// Query file or directory of .sql files [default: queries]
    #[arg(long = "path")]
    pub path: Option<PathBuf>,

    /// Database (schema) name [default: table]
    #[arg(long = "db")]
    pub db: Option<String>,

    /// Database type [default: mysql]
    #[arg(long = "type")]
    pub db_type: Option<String>,

    /// Number of repetitions of each query [default: 1]
    #[arg(long = "nr", value_parser = clap::value_parser!(u32).range(1..))]
    pub nr: Option<u32>,

    /// Seconds to wait for the initial connection [default: 10]
    #[arg(long = "connect-timeout", value_name = "SECONDS")]
    pub connect_timeout: Option<u64>,

    /// Per-statement time limit in seconds (0 = none)
    #[arg(long = "statement-timeout", value_name = "SECONDS")]
    pub statement_timeout: Option<u64>,

    /// TOML configuration file
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write a timestamped JSON report into this directory
    #[arg(long = "report-dir")]
    pub report_dir: Option<PathBuf>,
}

impl TestArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.pass.clone(),
            database: self.db.clone(),
            backend: self.db_type.clone(),
            path: self.path.clone(),
            repetitions: self.nr,
            connect_timeout_secs: self.connect_timeout,
            statement_timeout_secs: self.statement_timeout,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Query file or directory of .sql files [default: queries]
    #[arg(long = "path")]
    pub path: Option<PathBuf>,

    /// Database type, selects the comment syntax [default: mysql]
    #[arg(long = "type")]
    pub db_type: Option<String>,

    /// TOML configuration file
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
