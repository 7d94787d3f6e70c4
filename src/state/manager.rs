//! State manager implementation
//!
//! Holds the state handed to the tap with `--state` and the checkpoint the
//! current run has produced.

use super::types::Checkpoint;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::path::Path;
use tracing::debug;

/// Tracks sync state for one invocation
#[derive(Debug, Clone, Default)]
pub struct StateManager {
    /// State supplied by the caller (opaque, never used to resume)
    input: Option<JsonValue>,
    /// Latest checkpoint of this run
    current: Option<Checkpoint>,
}

impl StateManager {
    /// Create an empty state manager
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a state manager from a state file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file: {e}"),
        })?;
        debug!("Loaded state from {}", path.display());
        Self::from_json(&contents)
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        // Empty files are treated as no state
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        let input: JsonValue = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;

        Ok(Self {
            input: Some(input),
            current: None,
        })
    }

    /// State supplied by the caller
    pub fn input(&self) -> Option<&JsonValue> {
        self.input.as_ref()
    }

    /// Latest checkpoint of this run
    pub fn current(&self) -> Option<&Checkpoint> {
        self.current.as_ref()
    }

    /// Record that `stream` completed, replacing any previous checkpoint
    pub fn checkpoint(&mut self, stream: &str) -> &Checkpoint {
        self.current.insert(Checkpoint::now(stream))
    }

    /// Current state as JSON: the latest checkpoint, otherwise the input state
    pub fn value(&self) -> Result<JsonValue> {
        match &self.current {
            Some(checkpoint) => serde_json::to_value(checkpoint).map_err(|e| Error::State {
                message: format!("Failed to serialize state: {e}"),
            }),
            None => Ok(self.input.clone().unwrap_or_else(|| JsonValue::Object(Default::default()))),
        }
    }
}
