//! CLI module
//!
//! Command-line interface for the tap.
//!
//! # Modes
//!
//! - `--discover` - print the catalog of available streams
//! - default - sync the selected streams, emitting Singer messages on stdout

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
