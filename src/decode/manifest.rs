//! Bulk export manifest
//!
//! `GET data_export` returns the most recent export with one CSV resource per
//! entity type:
//!
//! ```json
//! {"kind": "dataExport", "data": [{"id": "...", "resources": [{"name": "tasks", "url": "..."}]}]}
//! ```

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Endpoint holding the export manifest
pub const DATA_EXPORT_ENDPOINT: &str = "data_export";

/// One downloadable CSV in an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResource {
    /// Entity name (matches the stream name)
    pub name: String,
    /// Download URL of the CSV payload
    pub url: String,
}

/// Resources available in the latest bulk export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportManifest {
    /// Available resources
    pub resources: Vec<ExportResource>,
}

#[derive(Deserialize)]
struct ExportEntry {
    #[serde(default)]
    resources: Vec<ExportResource>,
}

impl ExportManifest {
    /// Read the manifest out of a `data_export` response
    pub fn from_response(body: &JsonValue) -> Result<Self> {
        // Older payloads put `resources` at the top level
        if let Some(resources) = body.get("resources") {
            let resources = serde_json::from_value(resources.clone())
                .map_err(|e| Error::decode(format!("Invalid export resources: {e}")))?;
            return Ok(Self { resources });
        }

        let entries: Vec<ExportEntry> = body
            .get("data")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::decode(format!("Invalid export manifest: {e}")))?
            .ok_or_else(|| Error::decode("export manifest has no `data` list"))?;

        Ok(Self {
            resources: entries.into_iter().flat_map(|e| e.resources).collect(),
        })
    }

    /// The resource for a stream
    pub fn find(&self, name: &str) -> Result<&ExportResource> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::ResourceNotFound {
                name: name.to_string(),
            })
    }
}
