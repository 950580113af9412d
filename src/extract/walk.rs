//! Path-level driver: a single file, or every `.sql` file of a directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;

use super::classifier::Dialect;
use super::machine::extract_str;
use crate::error::{QueryTesterError, Result};
use crate::models::Query;

const QUERY_FILE_EXTENSION: &str = "sql";

/// Extract queries from `path`.
///
/// A file is extracted whatever its extension. A directory is listed
/// non-recursively; its `.sql` files are read concurrently and their queries
/// concatenated in file-name order. Any I/O error aborts the whole call.
pub async fn extract_path(path: &Path, dialect: &Dialect) -> Result<Vec<Query>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| QueryTesterError::path(path, e))?;

    if !metadata.is_dir() {
        return extract_file(path, dialect).await;
    }

    let files = list_query_files(path).await?;
    tracing::debug!(dir = %path.display(), files = files.len(), "found query files");

    let per_file = try_join_all(files.iter().map(|file| extract_file(file, dialect))).await?;
    Ok(per_file.into_iter().flatten().collect())
}

/// Queries of one file.
pub async fn extract_file(path: &Path, dialect: &Dialect) -> Result<Vec<Query>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| QueryTesterError::path(path, e))?;

    let queries = extract_str(&content, dialect, path);
    tracing::debug!(file = %path.display(), queries = queries.len(), "extracted");
    Ok(queries)
}

/// Regular files directly under `dir` with a `.sql` extension, sorted by name.
pub async fn list_query_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| QueryTesterError::path(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| QueryTesterError::path(dir, e))?
    {
        let path = entry.path();
        if path.extension() != Some(OsStr::new(QUERY_FILE_EXTENSION)) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| QueryTesterError::path(&path, e))?;
        // follow symlinks so a linked query file still counts
        let is_file = if file_type.is_symlink() {
            tokio::fs::metadata(&path)
                .await
                .map_err(|e| QueryTesterError::path(&path, e))?
                .is_file()
        } else {
            file_type.is_file()
        };
        if is_file {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
