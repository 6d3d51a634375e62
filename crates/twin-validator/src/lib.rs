//! Twin-Validator: recursive schema-driven validation of asset graphs
//!
//! Given a schema node, the validator resolves concrete assets from an
//! [`AssetDirectory`](twin_directory::AssetDirectory), checks their
//! dot-path properties against expected types and recursively validates
//! linked assets against nested schema nodes. The output of a run is an
//! ordered list of [`Issue`]s; an empty list means every asset conformed.
//!
//! ## Layer 1 - Validation Engine
//!
//! ## Key Components
//!
//! - `AssetValidator`: the engine (`validate`, `validate_schema`, `run`)
//! - `Issue` / `IssueLog`: findings and their append-only sink
//! - `ValidationReport`: run metadata plus findings
//! - `init_tracing`: subscriber setup for binaries

pub mod engine;
mod error;
pub mod issue;
pub mod lookup;
pub mod report;
pub mod telemetry;

pub use engine::AssetValidator;
pub use error::{Result, ValidatorError};
pub use issue::{Issue, IssueKind, IssueLog};
pub use lookup::{conforms, is_number, lookup_path};
pub use report::ValidationReport;
pub use telemetry::init_tracing;
