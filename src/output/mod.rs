//! Output module
//!
//! Singer messages (`SCHEMA`, `RECORD`, `STATE`) and the writer that puts them
//! on stdout.

mod types;
mod writer;

pub use types::Message;
pub use writer::MessageWriter;
