//! Error types for twin-directory

use thiserror::Error;

/// Failures of the asset directory itself.
///
/// Missing or malformed asset data is not an error at this layer; these
/// variants cover transport, authentication and configuration problems
/// only, and callers treat every one of them as fatal.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Directory could not be reached
    #[error("Asset directory unreachable: {0}")]
    Unreachable(String),

    /// Credentials were rejected
    #[error("Asset directory rejected credentials ({status}) for {url}")]
    Unauthorized { status: u16, url: String },

    /// Unexpected HTTP status
    #[error("Asset directory returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// Response body could not be decoded
    #[error("Failed to decode asset directory response: {0}")]
    Decode(String),

    /// Client configuration is invalid
    #[error("Invalid asset directory configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DirectoryError::Decode(err.to_string())
        } else if err.is_builder() {
            DirectoryError::Config(err.to_string())
        } else {
            DirectoryError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::Decode(err.to_string())
    }
}
