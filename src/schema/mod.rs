//! Stream schemas
//!
//! - **Catalog**: one JSON Schema per stream, built in or loaded from a directory
//! - **Transform**: coerces raw records into the types their schema declares

mod catalog;
mod transform;

pub use catalog::{SchemaCatalog, BUILTIN_SCHEMAS};
pub use transform::{normalize_datetime, Transformer};
