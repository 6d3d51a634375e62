//! Twin-Schema: declarative schema model for digital twin assets
//!
//! A schema describes what a class of assets in a remote asset directory
//! must look like: the source they belong to, dot-path properties with an
//! expected shape, and typed links whose targets are themselves described
//! by nested schema nodes.
//!
//! ## Layer 0 - Schema Model
//!
//! Pure data plus construction-time structural checks. No I/O beyond
//! loading schema files.
//!
//! ## Key Components
//!
//! - `AssetSchema`: one schema node (root or link target)
//! - `SchemaDocument`: a root node plus named definitions for `$ref` targets
//! - `load_schema_file`: JSON configuration loader

mod error;
mod loader;
pub mod model;

pub use error::SchemaError;
pub use loader::load_schema_file;
pub use model::{
    AssetSchema, LinkConstraint, PropType, PropertyConstraint, RealtimeRef,
    RelationshipConstraint, SchemaDigest, SchemaDocument, SchemaTarget,
};

/// Result type for schema operations
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
