//! Common types used throughout tap-wrike
//!
//! Shared type aliases and small enums used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Response Format
// ============================================================================

/// Body format expected from a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Decoded JSON document
    #[default]
    Json,
    /// CSV rows keyed by header
    Csv,
}

// ============================================================================
// Sync Strategy
// ============================================================================

/// How stream data is pulled from Wrike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// One JSON request per stream endpoint (following page tokens)
    #[default]
    Direct,
    /// CSV snapshot from the `data_export` manifest
    BulkExport,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_strategy_serde() {
        let mode: SyncStrategy = serde_json::from_str("\"bulk_export\"").unwrap();
        assert_eq!(mode, SyncStrategy::BulkExport);

        let json = serde_json::to_string(&SyncStrategy::Direct).unwrap();
        assert_eq!(json, "\"direct\"");
    }

    #[test]
    fn test_response_format_default() {
        assert_eq!(ResponseFormat::default(), ResponseFormat::Json);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("token".to_string()).none_if_empty(),
            Some("token".to_string())
        );
        assert_eq!(Some("  ".to_string()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
    }
}
