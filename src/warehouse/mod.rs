//! Destination warehouse module
//!
//! Bulk-export syncs rebuild each destination table from a fresh snapshot, so
//! the table is dropped before the first record of its stream is emitted.

mod bigquery;
mod types;

pub use bigquery::{BigQueryWarehouse, CREDENTIALS_ENV};
pub use types::TableRef;

use crate::error::Result;
use async_trait::async_trait;

/// Destination-side table management
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Drop `table` if it exists
    ///
    /// Returns whether a table was actually removed. An absent table is not
    /// an error.
    async fn drop_table_if_exists(&self, table: &TableRef) -> Result<bool>;
}
