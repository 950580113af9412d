use std::path::PathBuf;

use query_tester::backend::BackendFamily;
use query_tester::config::{DEFAULT_BACKEND, DEFAULT_PATH};
use query_tester::extract::{extract_path, Dialect};
use query_tester::report::{json_reporter, text, OutputFormat};
use query_tester::{QueryTesterError, Result};

use super::load_file_config;
use crate::args::ListArgs;

/// `list`: extraction only.
pub async fn handle_list(args: &ListArgs) -> Result<()> {
    let file = load_file_config(args.config.as_deref())?;

    let family: BackendFamily = args
        .db_type
        .clone()
        .or(file.connection.backend)
        .unwrap_or_else(|| DEFAULT_BACKEND.to_string())
        .parse()?;
    let path = args
        .path
        .clone()
        .or(file.run.path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));

    let queries = extract_path(&path, &Dialect::for_family(family)).await?;
    tracing::info!(path = %path.display(), queries = queries.len(), "listing queries");

    match args.format {
        OutputFormat::Text => print!("{}", text::render_listing(&queries)),
        OutputFormat::Json => {
            let json = json_reporter::render_listing(&queries).map_err(QueryTesterError::config)?;
            println!("{}", json);
        }
    }

    Ok(())
}
