//! Twin-Directory: asset directory access for twin conformance checks
//!
//! The validator never talks to the network itself. It consumes an
//! [`AssetDirectory`], which lists asset ids per data source, fetches asset
//! records by `(id, source)` and exposes the latest timeseries sample of a
//! realtime stream.
//!
//! ## Layer 0 - External Collaborator
//!
//! ## Key Components
//!
//! - `AssetDirectory`: async, backend-agnostic trait
//! - `AssetRecord` / `AssetLink`: asset documents and their outgoing links
//! - `HttpAssetDirectory`: REST backend configured via `DirectoryConfig`
//! - `fakes::MemoryAssetDirectory`: in-memory backend with a call log

pub mod directory;
mod error;
pub mod fakes;
pub mod http;
pub mod record;

pub use directory::AssetDirectory;
pub use error::DirectoryError;
pub use http::{DirectoryConfig, HttpAssetDirectory};
pub use record::{AssetLink, AssetRecord, TimeseriesValue};

/// Result type for directory operations
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
