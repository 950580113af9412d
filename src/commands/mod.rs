pub mod list;

use std::path::Path;

use query_tester::config::FileConfig;
use query_tester::Result;

/// Load the config file if one was given.
fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::load(path),
        None => Ok(FileConfig::default()),
    }
}
