//! Schema loading from configuration files.
//!
//! A schema file holds either a full [`SchemaDocument`]
//! (`{"root": ..., "definitions": {...}}`) or a bare [`AssetSchema`] object.
//! Every loaded document is structurally checked before it is returned.

use std::fs;
use std::path::Path;

use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::debug;

use crate::error::SchemaError;
use crate::model::{AssetSchema, SchemaDocument};
use crate::SchemaResult;

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Document(SchemaDocument),
    Bare(AssetSchema),
}

impl SchemaDocument {
    /// Parse and structurally check a schema from JSON text.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        parse_document(content, "<inline>")
    }
}

/// Load a schema document from a JSON file.
pub fn load_schema_file(path: &Path) -> SchemaResult<SchemaDocument> {
    let origin = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: origin.clone(),
        source,
    })?;
    let document = parse_document(&content, &origin)?;
    debug!(
        path = %origin,
        root_source = %document.root.source,
        definitions = document.definitions.len(),
        "Loaded schema"
    );
    Ok(document)
}

fn parse_document(content: &str, origin: &str) -> SchemaResult<SchemaDocument> {
    // Syntax pass first so errors keep serde's position info. Deserializing
    // from text (not from a `Value`) keeps property declaration order.
    serde_json::from_str::<IgnoredAny>(content).map_err(|e| SchemaError::malformed(origin, e))?;

    let document = match serde_json::from_str::<SchemaFile>(content) {
        Ok(SchemaFile::Document(document)) => document,
        Ok(SchemaFile::Bare(root)) => SchemaDocument::inline(root),
        Err(_) => {
            return Err(SchemaError::malformed(
                origin,
                "expected a schema document with a `root` node or a schema object with a `source`",
            ))
        }
    };

    document.validate_structure()?;
    Ok(document)
}
