//! Schema node types.
//!
//! An [`AssetSchema`] describes one class of assets: the data source they
//! live in, the scalar properties they must carry and the typed links they
//! must have to other assets. The same type is used for root nodes and for
//! the nested targets of links, so a whole schema is one tree of
//! `AssetSchema` values plus named [`SchemaDocument::definitions`] that
//! links may point at by name.
//!
//! Schema values are plain data. They are built once before a validation
//! run and only read while it runs.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SchemaError;
use crate::SchemaResult;

/// Expected runtime shape of a scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropType::String => write!(f, "string"),
            PropType::Number => write!(f, "number"),
        }
    }
}

/// One expected scalar property on an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyConstraint {
    /// Expected shape; `None` accepts anything present
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<PropType>,
    /// Informational; presence is always checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Discriminator literals (e.g. an asset kind tag)
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<serde_json::Value>>,
}

impl PropertyConstraint {
    /// Constraint that only requires the property to be present.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn number() -> Self {
        Self {
            expected_type: Some(PropType::Number),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self {
            expected_type: Some(PropType::String),
            ..Self::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<serde_json::Value>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Reference to a realtime stream backing an asset.
///
/// Declared for schema authoring; the validator does not dereference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeRef {
    pub id: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
}

/// Expected schema of the asset on the far side of a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaTarget {
    /// Named entry in [`SchemaDocument::definitions`]
    Ref {
        #[serde(rename = "$ref")]
        name: String,
    },
    /// Nested schema node
    Inline(Box<AssetSchema>),
}

impl SchemaTarget {
    pub fn reference(name: impl Into<String>) -> Self {
        SchemaTarget::Ref { name: name.into() }
    }

    /// Resolve against a set of named definitions.
    pub fn resolve_in<'a>(
        &'a self,
        definitions: &'a BTreeMap<String, AssetSchema>,
    ) -> Option<&'a AssetSchema> {
        match self {
            SchemaTarget::Inline(schema) => Some(&**schema),
            SchemaTarget::Ref { name } => definitions.get(name),
        }
    }
}

impl From<AssetSchema> for SchemaTarget {
    fn from(schema: AssetSchema) -> Self {
        SchemaTarget::Inline(Box::new(schema))
    }
}

/// One expected outgoing link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConstraint {
    /// Tag matched against the `type` of the asset's actual links
    #[serde(rename = "type")]
    pub link_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime: Option<RealtimeRef>,
    pub asset: SchemaTarget,
}

impl LinkConstraint {
    pub fn new(link_type: impl Into<String>, asset: impl Into<SchemaTarget>) -> Self {
        Self {
            link_type: link_type.into(),
            realtime: None,
            asset: asset.into(),
        }
    }

    pub fn with_realtime(mut self, realtime: RealtimeRef) -> Self {
        self.realtime = Some(realtime);
        self
    }
}

/// Expected ancestors/children of an asset.
///
/// Carried for schema completeness only; no check consults it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime: Option<RealtimeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<SchemaTarget>,
}

/// A schema node: what a class of assets must look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSchema {
    /// Data source (namespace) the assets belong to
    pub source: String,
    /// When non-empty, validate exactly these ids instead of listing the source
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// Dot-path -> constraint, checked in declaration order
    #[serde(default, alias = "own_properties")]
    pub properties: IndexMap<String, PropertyConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipConstraint>,
}

impl AssetSchema {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ids: None,
            properties: IndexMap::new(),
            links: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_property(mut self, path: impl Into<String>, constraint: PropertyConstraint) -> Self {
        self.properties.insert(path.into(), constraint);
        self
    }

    pub fn with_link(mut self, link: LinkConstraint) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_relationship(mut self, relationship: RelationshipConstraint) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Explicit ids, if any were given. An empty list counts as none.
    pub fn explicit_ids(&self) -> Option<&[String]> {
        match &self.ids {
            Some(ids) if !ids.is_empty() => Some(ids.as_slice()),
            _ => None,
        }
    }

    /// Link types this node requires, in declaration order.
    pub fn required_link_types(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|l| l.link_type.as_str())
    }

    fn check_structure(
        &self,
        location: &str,
        definitions: &BTreeMap<String, AssetSchema>,
    ) -> SchemaResult<()> {
        if self.source.trim().is_empty() {
            return Err(SchemaError::EmptySource {
                location: location.to_string(),
            });
        }

        for path in self.properties.keys() {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(SchemaError::InvalidPropertyPath {
                    location: location.to_string(),
                    path: path.clone(),
                });
            }
        }

        for link in &self.links {
            if link.link_type.trim().is_empty() {
                return Err(SchemaError::EmptyLinkType {
                    location: location.to_string(),
                });
            }
            let nested = format!("{}.links[{}]", location, link.link_type);
            check_target(&link.asset, &nested, definitions)?;
        }

        for (i, relationship) in self.relationships.iter().enumerate() {
            if let Some(target) = &relationship.asset {
                let nested = format!("{}.relationships[{}]", location, i);
                check_target(target, &nested, definitions)?;
            }
        }

        Ok(())
    }
}

fn check_target(
    target: &SchemaTarget,
    location: &str,
    definitions: &BTreeMap<String, AssetSchema>,
) -> SchemaResult<()> {
    match target {
        SchemaTarget::Ref { name } => {
            // Definitions are checked on their own, which keeps ref cycles finite.
            if definitions.contains_key(name) {
                Ok(())
            } else {
                Err(SchemaError::UnknownReference {
                    location: location.to_string(),
                    name: name.clone(),
                })
            }
        }
        SchemaTarget::Inline(schema) => schema.check_structure(location, definitions),
    }
}

/// A root schema plus the named nodes its links may refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub root: AssetSchema,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, AssetSchema>,
}

impl SchemaDocument {
    /// Wrap a self-contained schema tree.
    pub fn inline(root: AssetSchema) -> Self {
        Self {
            root,
            definitions: BTreeMap::new(),
        }
    }

    pub fn with_definition(mut self, name: impl Into<String>, schema: AssetSchema) -> Self {
        self.definitions.insert(name.into(), schema);
        self
    }

    /// Resolve a link target to the schema node it describes.
    pub fn resolve<'a>(&'a self, target: &'a SchemaTarget) -> Option<&'a AssetSchema> {
        target.resolve_in(&self.definitions)
    }

    /// Check the contract every schema node must meet before a run.
    pub fn validate_structure(&self) -> SchemaResult<()> {
        self.root.check_structure("root", &self.definitions)?;
        for (name, schema) in &self.definitions {
            schema.check_structure(&format!("definitions.{}", name), &self.definitions)?;
        }
        Ok(())
    }

    /// Digest of the canonical JSON encoding of this document.
    pub fn digest(&self) -> SchemaResult<SchemaDigest> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| SchemaError::malformed("<in-memory>", e))?;
        Ok(SchemaDigest::from_bytes(&bytes))
    }
}

/// SHA-256 hex digest identifying a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaDigest(String);

impl SchemaDigest {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        SchemaDigest(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for SchemaDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
