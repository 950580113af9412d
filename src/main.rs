//! query-tester - run hand-written SQL against a live database
//!
//! # Usage
//!
//! ```bash
//! # List the statements found under ./queries
//! query-tester list --path queries
//!
//! # Run each statement 3 times against MySQL
//! query-tester test --host db --port 3306 --user app --pass secret --db shop --nr 3
//!
//! # JSON output
//! query-tester test --path smoke.sql --format json
//! ```

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use query_tester::logging::init_logging;

mod args;
mod commands;

use args::{Cli, Command};
use commands::list::handle_list;
use commands::test::handle_test;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = init_logging(cli.verbose, cli.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let outcome = match &cli.command {
        Command::Test(args) => handle_test(args).await,
        Command::List(args) => handle_list(args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "fatal");
            eprintln!("{} [{}]: {}", "error".red().bold(), e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
