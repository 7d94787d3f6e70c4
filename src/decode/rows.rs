//! Forward-only CSV rows
//!
//! A bulk export body is parsed lazily: rows are produced one at a time as
//! the iterator is advanced. The sequence is consumed once; iterating again
//! requires a new fetch.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, StringMap};
use bytes::Bytes;
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Lazy sequence of CSV rows keyed by column header
pub struct CsvRows {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<Cursor<Bytes>>,
    position: u64,
}

impl CsvRows {
    /// Start reading rows from a CSV body; the first line holds the headers
    pub fn from_bytes(body: Bytes) -> Result<Self> {
        let body = if body.starts_with(UTF8_BOM) {
            body.slice(UTF8_BOM.len()..)
        } else {
            body
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(body));

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            headers,
            records: reader.into_records(),
            position: 0,
        })
    }

    /// Column headers
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows produced so far
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Iterator for CsvRows {
    type Item = Result<StringMap>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(Error::Csv(e))),
        };
        self.position += 1;

        // Short rows leave trailing columns absent; extra cells are ignored
        let row = self
            .headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();

        Some(Ok(row))
    }
}

impl std::fmt::Debug for CsvRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRows")
            .field("headers", &self.headers)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Turn a CSV row into a raw record for the transformer
pub fn row_to_record(row: StringMap) -> JsonObject {
    row.into_iter()
        .map(|(k, v)| (k, JsonValue::String(v)))
        .collect()
}
