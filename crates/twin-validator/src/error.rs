//! Error taxonomy for validation runs.
//!
//! Findings about asset data are never errors; they are recorded as
//! [`Issue`](crate::Issue)s. These variants abort a run.

use twin_directory::DirectoryError;
use twin_schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Result type for validation runs.
pub type Result<T> = std::result::Result<T, ValidatorError>;
