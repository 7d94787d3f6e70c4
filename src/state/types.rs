//! State types
//!
//! The tap keeps a single checkpoint: when the last stream finished and which
//! stream it was. It is overwritten after every stream, never merged.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Checkpoint written after a stream completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Completion time, RFC 3339 UTC
    pub last_updated_at: String,
    /// Stream that just completed
    pub stream: String,
}

impl Checkpoint {
    /// Checkpoint for a stream completed at `at`
    pub fn new(stream: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            last_updated_at: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            stream: stream.into(),
        }
    }

    /// Checkpoint for a stream completed now
    pub fn now(stream: impl Into<String>) -> Self {
        Self::new(stream, Utc::now())
    }
}
