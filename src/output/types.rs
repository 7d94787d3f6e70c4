//! Singer message types
//!
//! One JSON document per line on stdout, discriminated by `type`.

use crate::catalog::KEY_PROPERTIES;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message emitted during sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Announces the schema of the records that follow
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema for the stream
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
    },
    /// A single transformed record
    Record {
        /// Stream name
        stream: String,
        /// Record data
        record: JsonObject,
        /// When the response carrying this record was received
        time_extracted: DateTime<Utc>,
    },
    /// Sync state checkpoint
    State {
        /// State value
        value: JsonValue,
    },
}

impl Message {
    /// Create a schema message keyed on the tap's key properties
    pub fn schema(stream: impl Into<String>, schema: JsonValue) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: KEY_PROPERTIES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Create a record message
    pub fn record(stream: impl Into<String>, record: JsonObject, time_extracted: DateTime<Utc>) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted,
        }
    }

    /// Create a state message
    pub fn state(value: JsonValue) -> Self {
        Self::State { value }
    }

    /// Stream the message belongs to, if any
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}
