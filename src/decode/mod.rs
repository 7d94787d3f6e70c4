//! Response decoder module
//!
//! Supports: Wrike JSON envelopes, the bulk export manifest, and CSV rows.

mod json;
mod manifest;
mod rows;

pub use json::{extract_data, next_page_token};
pub use manifest::{ExportManifest, ExportResource, DATA_EXPORT_ENDPOINT};
pub use rows::{row_to_record, CsvRows};

#[cfg(test)]
mod tests;
