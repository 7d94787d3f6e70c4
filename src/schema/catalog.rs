//! Schema catalog
//!
//! One JSON Schema document per stream, keyed by the file stem of the schema
//! file it was loaded from.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Schemas compiled into the binary
pub static BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    ("contacts", include_str!("../../schemas/contacts.json")),
    ("customfields", include_str!("../../schemas/customfields.json")),
    ("folders", include_str!("../../schemas/folders.json")),
    ("tasks", include_str!("../../schemas/tasks.json")),
    ("timelogs", include_str!("../../schemas/timelogs.json")),
    ("workflows", include_str!("../../schemas/workflows.json")),
];

/// Immutable set of stream schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: BTreeMap<String, JsonValue>,
}

impl SchemaCatalog {
    /// Schemas from `dir` when given, otherwise the built-in set
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    /// The schemas shipped with the tap
    pub fn builtin() -> Result<Self> {
        let mut schemas = BTreeMap::new();
        for (name, source) in BUILTIN_SCHEMAS {
            let schema: JsonValue = serde_json::from_str(source).map_err(|e| {
                Error::config(format!("Built-in schema '{name}' is invalid: {e}"))
            })?;
            schemas.insert((*name).to_string(), schema);
        }
        Ok(Self { schemas })
    }

    /// Every `<stream>.json` file in a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::FileNotFound {
                path: dir.display().to_string(),
            });
        }

        let mut schemas = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let contents = std::fs::read_to_string(&path)?;
            let schema: JsonValue = serde_json::from_str(&contents).map_err(|e| {
                Error::config(format!("Schema file {} is invalid: {e}", path.display()))
            })?;

            debug!("Loaded schema for '{name}' from {}", path.display());
            schemas.insert(name.to_string(), schema);
        }

        Ok(Self { schemas })
    }

    /// Build a catalog from in-memory schemas
    pub fn from_schemas<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = (S, JsonValue)>,
        S: Into<String>,
    {
        Self {
            schemas: schemas.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        }
    }

    /// Names of every stream with a schema, sorted
    pub fn list_streams(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// The schema for a stream
    pub fn get_schema(&self, name: &str) -> Result<&JsonValue> {
        self.schemas
            .get(name)
            .ok_or_else(|| Error::SchemaNotFound {
                stream: name.to_string(),
            })
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether there are no schemas at all
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
