//! Warehouse types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified destination table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Project id
    pub project: String,
    /// Dataset id
    pub dataset: String,
    /// Table id (the stream name)
    pub table: String,
}

impl TableRef {
    /// Create a table reference
    pub fn new(project: impl Into<String>, dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}
