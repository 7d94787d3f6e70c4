//! Execution engine module
//!
//! The `SyncDriver` runs selected streams one after another. Per stream:
//!
//! 1. emit `SCHEMA`
//! 2. fetch (direct JSON pages, or the bulk-export CSV after dropping the
//!    destination table)
//! 3. transform each record and emit `RECORD`
//! 4. overwrite the checkpoint and emit `STATE`
//!
//! The first error aborts the run; the failing stream is not checkpointed.

mod types;

pub use types::SyncStats;

use crate::config::TapConfig;
use crate::decode::{
    extract_data, next_page_token, row_to_record, ExportManifest, DATA_EXPORT_ENDPOINT,
};
use crate::error::{Error, Result};
use crate::http::FetchClient;
use crate::output::{Message, MessageWriter};
use crate::schema::{SchemaCatalog, Transformer};
use crate::state::StateManager;
use crate::types::SyncStrategy;
use crate::warehouse::Warehouse;
use chrono::Utc;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sequential sync driver
pub struct SyncDriver<'a> {
    config: &'a TapConfig,
    client: &'a FetchClient,
    schemas: &'a SchemaCatalog,
    warehouse: Option<&'a dyn Warehouse>,
    stats: SyncStats,
}

impl<'a> SyncDriver<'a> {
    /// Create a new sync driver
    pub fn new(config: &'a TapConfig, client: &'a FetchClient, schemas: &'a SchemaCatalog) -> Self {
        Self {
            config,
            client,
            schemas,
            warehouse: None,
            stats: SyncStats::default(),
        }
    }

    /// Destination warehouse for bulk-export mode
    #[must_use]
    pub fn with_warehouse(mut self, warehouse: &'a dyn Warehouse) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync every stream in order
    pub async fn sync<W: Write>(
        &mut self,
        streams: &[&str],
        state: &mut StateManager,
        out: &mut MessageWriter<W>,
    ) -> Result<()> {
        let start = Instant::now();

        for stream in streams {
            self.sync_stream(stream, state, out).await?;
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Sync finished: {} streams, {} records, {} responses in {}ms",
            self.stats.streams_synced,
            self.stats.records_synced,
            self.stats.pages_fetched,
            self.stats.duration_ms
        );
        Ok(())
    }

    /// Sync a single stream, returning the number of records emitted
    pub async fn sync_stream<W: Write>(
        &mut self,
        stream: &str,
        state: &mut StateManager,
        out: &mut MessageWriter<W>,
    ) -> Result<usize> {
        let schemas = self.schemas;
        let schema = schemas.get_schema(stream)?;
        info!("Starting sync for stream: {stream} ({:?})", self.config.mode);

        out.write(&Message::schema(stream, schema.clone()))?;

        let transformer = Transformer::new(stream, schema);
        let count = match self.config.mode {
            SyncStrategy::Direct => self.sync_direct(stream, &transformer, out).await?,
            SyncStrategy::BulkExport => self.sync_bulk_export(stream, &transformer, out).await?,
        };

        state.checkpoint(stream);
        out.write(&Message::state(state.value()?))?;

        self.stats.add_stream();
        info!("Completed sync for {stream}: {count} records");
        Ok(count)
    }

    /// `GET <stream>`, following `nextPageToken` until Wrike stops sending one
    async fn sync_direct<W: Write>(
        &mut self,
        stream: &str,
        transformer: &Transformer<'_>,
        out: &mut MessageWriter<W>,
    ) -> Result<usize> {
        let mut count = 0;
        let mut page_token: Option<String> = None;

        loop {
            let mut params = Vec::new();
            if let Some(size) = self.config.page_size {
                params.push(("pageSize".to_string(), size.to_string()));
            }
            if let Some(token) = &page_token {
                params.push(("nextPageToken".to_string(), token.clone()));
            }

            let body = self.client.fetch_json(stream, &params).await?;
            let extracted_at = Utc::now();
            self.stats.add_page();

            let records = extract_data(&body)?;
            debug!(
                "Page {}: fetched {} records for {stream}",
                self.stats.pages_fetched,
                records.len()
            );

            for raw in &records {
                let record = transformer.transform(raw)?;
                out.write(&Message::record(stream, record, extracted_at))?;
                count += 1;
            }
            self.stats.add_records(records.len());

            match next_page_token(&body) {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    warn!("Wrike repeated page token for {stream}, stopping pagination");
                    break;
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(count)
    }

    /// Manifest lookup, destination drop, then the CSV snapshot
    async fn sync_bulk_export<W: Write>(
        &mut self,
        stream: &str,
        transformer: &Transformer<'_>,
        out: &mut MessageWriter<W>,
    ) -> Result<usize> {
        let body = self.client.fetch_json(DATA_EXPORT_ENDPOINT, &[]).await?;
        let manifest = ExportManifest::from_response(&body)?;
        let resource = manifest.find(stream)?;

        let table = self.config.destination_table(stream)?;
        let warehouse = self
            .warehouse
            .ok_or_else(|| Error::warehouse("bulk export requires a destination warehouse"))?;
        if warehouse.drop_table_if_exists(&table).await? {
            self.stats.add_dropped_table();
        }

        let rows = self.client.fetch_csv(&resource.url, &[]).await?;
        let extracted_at = Utc::now();
        self.stats.add_page();

        let mut count = 0;
        for row in rows {
            let record = transformer.transform(&row_to_record(row?))?;
            out.write(&Message::record(stream, record, extracted_at))?;
            count += 1;
        }
        self.stats.add_records(count);

        Ok(count)
    }
}

impl std::fmt::Debug for SyncDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncDriver")
            .field("mode", &self.config.mode)
            .field("streams", &self.schemas.list_streams())
            .field("has_warehouse", &self.warehouse.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}
