//! State management module
//!
//! The tap writes a checkpoint (`last_updated_at`, `stream`) after every
//! completed stream. Each checkpoint replaces the previous one. State supplied
//! with `--state` is validated and kept, but syncs always run in full.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::Checkpoint;

#[cfg(test)]
mod manager_tests;
