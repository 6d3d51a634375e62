//! Asset records as returned by the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// A typed, directed reference from one asset to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetLink {
    #[serde(rename = "type")]
    pub link_type: String,
    pub id: String,
    pub source: String,
}

impl AssetLink {
    pub fn new(
        link_type: impl Into<String>,
        id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            link_type: link_type.into(),
            id: id.into(),
            source: source.into(),
        }
    }

    fn from_entry(entry: &Value) -> Option<Self> {
        Some(Self {
            link_type: entry.get("type")?.as_str()?.to_string(),
            id: scalar_id(entry.get("id")?)?,
            source: entry.get("source")?.as_str()?.to_string(),
        })
    }
}

/// An asset document of arbitrary shape plus its outgoing links.
///
/// The document is kept exactly as received; the validator reads it through
/// dot-path lookups and never assumes a closed set of top-level fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct AssetRecord {
    document: Value,
    links: Vec<AssetLink>,
}

impl AssetRecord {
    /// Build a record from a JSON document, extracting its `links` array.
    ///
    /// Link entries without a string `type`, an `id` and a string `source`
    /// are skipped.
    pub fn from_document(document: Value) -> Self {
        let links = match document.get("links").and_then(Value::as_array) {
            Some(entries) => entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    let link = AssetLink::from_entry(entry);
                    if link.is_none() {
                        warn!(index, "Skipping malformed link entry");
                    }
                    link
                })
                .collect(),
            None => Vec::new(),
        };
        Self { document, links }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn links(&self) -> &[AssetLink] {
        &self.links
    }

    /// Asset id as recorded in the document, if any.
    pub fn id(&self) -> Option<String> {
        self.document.get("id").and_then(scalar_id)
    }

    pub fn source(&self) -> Option<&str> {
        self.document.get("source").and_then(Value::as_str)
    }

    /// First link of the given type, in the record's own link order.
    pub fn first_link(&self, link_type: &str) -> Option<&AssetLink> {
        self.links.iter().find(|l| l.link_type == link_type)
    }
}

impl From<Value> for AssetRecord {
    fn from(document: Value) -> Self {
        Self::from_document(document)
    }
}

impl Serialize for AssetRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

/// Latest sample of a realtime stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesValue {
    #[serde(alias = "time")]
    pub timestamp: DateTime<Utc>,
    pub value: Value,
}

/// Ids arrive as strings from most sources, occasionally as bare numbers.
pub(crate) fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_links_are_extracted_in_order() {
        let record = AssetRecord::from_document(json!({
            "id": "a1",
            "source": "s1",
            "links": [
                { "type": "signal", "id": "m1", "source": "s2" },
                { "type": "parent", "id": "p1", "source": "s1" },
                { "type": "signal", "id": "m2", "source": "s2" }
            ]
        }));

        assert_eq!(record.links().len(), 3);
        assert_eq!(record.first_link("signal").unwrap().id, "m1");
        assert_eq!(record.first_link("parent").unwrap().source, "s1");
        assert!(record.first_link("missing").is_none());
    }

    #[test]
    fn test_malformed_links_are_skipped() {
        let record = AssetRecord::from_document(json!({
            "links": [
                { "type": "signal", "id": "m1" },
                "not-a-link",
                { "type": 3, "id": "x", "source": "s" },
                { "type": "signal", "id": 17, "source": "s2" }
            ]
        }));

        assert_eq!(record.links(), [AssetLink::new("signal", "17", "s2")]);
    }

    #[test]
    fn test_links_absent_or_not_an_array() {
        assert!(AssetRecord::from_document(json!({ "x": 1 })).links().is_empty());
        assert!(AssetRecord::from_document(json!({ "links": {} })).links().is_empty());
        assert!(AssetRecord::from_document(json!(null)).links().is_empty());
    }

    #[test]
    fn test_id_and_source_accessors() {
        let record = AssetRecord::from_document(json!({ "id": 42, "source": "s1" }));
        assert_eq!(record.id().as_deref(), Some("42"));
        assert_eq!(record.source(), Some("s1"));
    }

    #[test]
    fn test_deserialize_keeps_document() {
        let record: AssetRecord =
            serde_json::from_str(r#"{"id":"a1","derived":{"low":1.5}}"#).unwrap();
        assert_eq!(record.document()["derived"]["low"], json!(1.5));
        assert_eq!(serde_json::to_value(&record).unwrap()["id"], json!("a1"));
    }

    #[test]
    fn test_timeseries_accepts_time_alias() {
        let value: TimeseriesValue =
            serde_json::from_str(r#"{"time":"2024-01-01T00:00:00Z","value":3.5}"#).unwrap();
        assert_eq!(value.value, json!(3.5));
    }
}
