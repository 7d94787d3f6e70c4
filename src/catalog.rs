//! Singer catalog
//!
//! The document printed by `--discover` and read back with `--catalog`:
//!
//! ```json
//! {"streams": [{"tap_stream_id": "tasks", "stream": "tasks", "schema": {...},
//!               "key_properties": ["id"], "metadata": []}]}
//! ```

use crate::error::{Error, Result};
use crate::schema::SchemaCatalog;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key properties of every Wrike stream
pub const KEY_PROPERTIES: &[&str] = &["id"];

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered or supplied catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogEntry>,
}

/// Stream in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable stream identifier
    pub tap_stream_id: String,

    /// Stream name
    pub stream: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub schema: JsonValue,

    /// Primary key fields
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Per-breadcrumb metadata
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// Metadata attached to a point in a stream's schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path into the schema; empty for the stream itself
    #[serde(default)]
    pub breadcrumb: Vec<String>,

    /// Arbitrary metadata (`selected`, `inclusion`, ...)
    #[serde(default)]
    pub metadata: JsonObject,
}

impl CatalogEntry {
    /// Entry for a stream with its schema and no metadata
    pub fn new(stream: impl Into<String>, schema: JsonValue) -> Self {
        let stream = stream.into();
        Self {
            tap_stream_id: stream.clone(),
            stream,
            schema,
            key_properties: KEY_PROPERTIES.iter().map(ToString::to_string).collect(),
            metadata: Vec::new(),
        }
    }

    /// Whether the stream was selected for sync
    ///
    /// Checks `selected` on the root breadcrumb first, then on the schema.
    pub fn is_selected(&self) -> bool {
        let from_metadata = self
            .metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .and_then(|m| m.metadata.get("selected"))
            .and_then(JsonValue::as_bool);

        from_metadata
            .or_else(|| self.schema.get("selected").and_then(JsonValue::as_bool))
            .unwrap_or(false)
    }
}

impl Catalog {
    /// Build the catalog from every known schema
    pub fn discover(schemas: &SchemaCatalog) -> Result<Self> {
        let streams = schemas
            .list_streams()
            .into_iter()
            .map(|name| Ok(CatalogEntry::new(name, schemas.get_schema(name)?.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { streams })
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("Invalid catalog: {e}")))
    }

    /// Load a catalog file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Names of the selected streams, in catalog order
    pub fn selected_streams(&self) -> Vec<&str> {
        self.streams
            .iter()
            .filter(|s| s.is_selected())
            .map(|s| s.stream.as_str())
            .collect()
    }

    /// Names of every stream, in catalog order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.stream.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn two_stream_schemas() -> SchemaCatalog {
        SchemaCatalog::from_schemas([
            ("tasks", json!({"type": "object", "properties": {"id": {"type": "string"}}})),
            ("folders", json!({"type": "object"})),
        ])
    }

    #[test]
    fn test_discover() {
        let catalog = Catalog::discover(&two_stream_schemas()).unwrap();

        assert_eq!(catalog.stream_names(), vec!["folders", "tasks"]);
        for entry in &catalog.streams {
            assert_eq!(entry.key_properties, vec!["id".to_string()]);
            assert_eq!(entry.tap_stream_id, entry.stream);
            assert!(entry.metadata.is_empty());
        }
    }

    #[test]
    fn test_discover_serialized_shape() {
        let catalog = Catalog::discover(&two_stream_schemas()).unwrap();
        let value = serde_json::to_value(&catalog).unwrap();

        assert_eq!(
            value["streams"][1],
            json!({
                "tap_stream_id": "tasks",
                "stream": "tasks",
                "schema": {"type": "object", "properties": {"id": {"type": "string"}}},
                "key_properties": ["id"],
                "metadata": []
            })
        );
    }

    #[test]
    fn test_selection_from_metadata() {
        let catalog = Catalog::from_json(
            r#"{"streams": [
                {"tap_stream_id": "tasks", "stream": "tasks", "schema": {},
                 "metadata": [{"breadcrumb": [], "metadata": {"selected": true}}]},
                {"tap_stream_id": "folders", "stream": "folders", "schema": {},
                 "metadata": [{"breadcrumb": [], "metadata": {"selected": false}}]},
                {"tap_stream_id": "contacts", "stream": "contacts", "schema": {}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(catalog.selected_streams(), vec!["tasks"]);
    }

    #[test]
    fn test_selection_from_schema() {
        let catalog = Catalog::from_json(
            r#"{"streams": [
                {"tap_stream_id": "tasks", "stream": "tasks", "schema": {"selected": true}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(catalog.selected_streams(), vec!["tasks"]);
    }

    #[test]
    fn test_property_metadata_does_not_select_stream() {
        let entry = CatalogEntry {
            metadata: vec![MetadataEntry {
                breadcrumb: vec!["properties".into(), "title".into()],
                metadata: json!({"selected": true}).as_object().cloned().unwrap_or_default(),
            }],
            ..CatalogEntry::new("tasks", json!({}))
        };
        assert!(!entry.is_selected());
    }

    #[test]
    fn test_from_json_invalid() {
        let err = Catalog::from_json(r#"{"streams": "nope"}"#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Catalog::from_file("/no/such/catalog.json").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
