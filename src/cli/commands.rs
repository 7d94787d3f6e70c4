//! CLI arguments
//!
//! Follows the Singer tap convention: a single binary driven by flags rather
//! than subcommands.

use clap::Parser;
use std::path::PathBuf;

/// Singer tap for the Wrike API
#[derive(Parser, Debug)]
#[command(name = "tap-wrike")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// State file (JSON)
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Catalog file selecting streams (older Singer flag)
    #[arg(short, long)]
    pub properties: Option<PathBuf>,

    /// Catalog file selecting streams
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the catalog of available streams and exit
    #[arg(short, long)]
    pub discover: bool,
}

impl Cli {
    /// Catalog file to read selection from, `--catalog` winning over `--properties`
    pub fn catalog_path(&self) -> Option<&PathBuf> {
        self.catalog.as_ref().or(self.properties.as_ref())
    }
}
