//! Line-oriented message writer

use super::types::Message;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Writes Singer messages, one JSON document per line
///
/// Every message is flushed as soon as it is written so downstream targets see
/// records as they are produced.
#[derive(Debug)]
pub struct MessageWriter<W: Write> {
    out: W,
    written: usize,
}

impl MessageWriter<std::io::Stdout> {
    /// Writer on the process's standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> MessageWriter<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Write one message and flush
    pub fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Write a document as indented JSON (used for the discovered catalog)
    pub fn write_pretty<T: Serialize>(&mut self, document: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, document)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    /// Number of messages written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Get the underlying writer back
    pub fn into_inner(self) -> W {
        self.out
    }
}
