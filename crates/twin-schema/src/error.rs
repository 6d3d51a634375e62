//! Error types for twin-schema

use thiserror::Error;

/// Errors raised while loading or structurally checking a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema node declares an empty data source
    #[error("schema at {location} has an empty source")]
    EmptySource { location: String },

    /// Property key is not a usable dot-path
    #[error("schema at {location} has an invalid property path '{path}'")]
    InvalidPropertyPath { location: String, path: String },

    /// Link constraint without a link type
    #[error("schema at {location} declares a link with an empty type")]
    EmptyLinkType { location: String },

    /// `$ref` target is not among the document definitions
    #[error("schema at {location} references unknown definition '{name}'")]
    UnknownReference { location: String, name: String },

    /// Schema file could not be read
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Schema file is not a valid schema document
    #[error("malformed schema {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl SchemaError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
