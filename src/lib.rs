// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unused_async)]

//! # tap-wrike
//!
//! A Singer tap for the Wrike project management API.
//!
//! ## Features
//!
//! - **Discovery**: one stream per JSON Schema file, printed as a Singer catalog
//! - **Direct sync**: paginated JSON requests per stream endpoint
//! - **Bulk export sync**: CSV snapshots from Wrike's data export, with the
//!   BigQuery destination table dropped first
//! - **Fetch client**: bearer auth, 100 requests per 15s window, exponential backoff
//!
//! ## Quick Start
//!
//! ```text
//! tap-wrike --config config.json --discover > catalog.json
//! tap-wrike --config config.json --catalog catalog.json | target-bigquery
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      cli::Runner                           │
//! │   --discover → catalog         default → SyncDriver        │
//! └────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬────────────┬─────┴──────┬────────────┬──────────┐
//! │  schema  │    http    │   decode   │ warehouse  │  output  │
//! ├──────────┼────────────┼────────────┼────────────┼──────────┤
//! │ Catalog  │ Retry      │ JSON data  │ BigQuery   │ SCHEMA   │
//! │ Transform│ Rate limit │ Manifest   │ drop table │ RECORD   │
//! │          │ Transport  │ CSV rows   │            │ STATE    │
//! └──────────┴────────────┴────────────┴────────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication (Wrike bearer token, Google service accounts)
pub mod auth;

/// Fetch client with retry and rate limiting
pub mod http;

/// Response decoders (JSON envelopes, export manifest, CSV)
pub mod decode;

/// Stream schemas and record transformation
pub mod schema;

/// Singer catalog and stream selection
pub mod catalog;

/// Destination table management
pub mod warehouse;

/// Sync state checkpointing
pub mod state;

/// Singer message output
pub mod output;

/// Sync driver
pub mod engine;

/// Tap configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use catalog::Catalog;
pub use config::TapConfig;
pub use engine::SyncDriver;
pub use schema::SchemaCatalog;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
