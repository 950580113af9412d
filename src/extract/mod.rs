//! Query extraction: files of SQL into ordered, annotated [`Query`] records.
//!
//! [`Query`]: crate::models::Query

pub mod classifier;
pub mod machine;
pub mod walk;

pub use classifier::{is_statement_start, Dialect, LineKind};
pub use machine::{extract_str, Extractor};
pub use walk::{extract_file, extract_path, list_query_files};
