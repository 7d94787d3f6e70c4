//! CLI runner - executes discovery or sync

use crate::catalog::Catalog;
use crate::cli::commands::Cli;
use crate::config::TapConfig;
use crate::engine::SyncDriver;
use crate::error::Result;
use crate::http::FetchClient;
use crate::output::MessageWriter;
use crate::schema::SchemaCatalog;
use crate::state::StateManager;
use crate::types::SyncStrategy;
use crate::warehouse::BigQueryWarehouse;
use std::io::Write;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run against the process's stdout
    pub async fn run(&self) -> Result<()> {
        let mut out = MessageWriter::stdout();
        self.run_with_writer(&mut out).await
    }

    /// Run, writing the catalog or Singer messages to `out`
    pub async fn run_with_writer<W: Write>(&self, out: &mut MessageWriter<W>) -> Result<()> {
        let config = TapConfig::from_file(&self.cli.config)?;
        let schemas = SchemaCatalog::load(config.schemas_dir.as_deref())?;

        if self.cli.discover {
            self.discover(&schemas, out)
        } else {
            self.sync(&config, &schemas, out).await
        }
    }

    fn discover<W: Write>(&self, schemas: &SchemaCatalog, out: &mut MessageWriter<W>) -> Result<()> {
        let catalog = Catalog::discover(schemas)?;
        info!("Discovered {} streams", catalog.streams.len());
        out.write_pretty(&catalog)
    }

    async fn sync<W: Write>(
        &self,
        config: &TapConfig,
        schemas: &SchemaCatalog,
        out: &mut MessageWriter<W>,
    ) -> Result<()> {
        config.validate()?;

        let streams: Vec<String> = match self.cli.catalog_path() {
            Some(path) => {
                let catalog = Catalog::from_file(path)?;
                let selected: Vec<String> =
                    catalog.selected_streams().into_iter().map(String::from).collect();
                if selected.is_empty() {
                    warn!("No streams selected in {}", path.display());
                }
                selected
            }
            // Discovered catalogs select everything
            None => schemas.list_streams().into_iter().map(String::from).collect(),
        };

        let mut state = match &self.cli.state {
            Some(path) => StateManager::from_file(path)?,
            None => StateManager::in_memory(),
        };

        let client = FetchClient::new(config.fetch_client_config()?)?;
        let warehouse = match config.mode {
            SyncStrategy::BulkExport => Some(BigQueryWarehouse::from_config(config)?),
            SyncStrategy::Direct => None,
        };

        let mut driver = SyncDriver::new(config, &client, schemas);
        if let Some(warehouse) = &warehouse {
            driver = driver.with_warehouse(warehouse);
        }

        let names: Vec<&str> = streams.iter().map(String::as_str).collect();
        info!("Syncing {} streams: {}", names.len(), names.join(", "));
        driver.sync(&names, &mut state, out).await
    }
}
