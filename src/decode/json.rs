//! Wrike JSON envelope helpers
//!
//! Every Wrike v4 response wraps its payload as `{"kind": ..., "data": [...]}`
//! and, for paged requests, adds a `nextPageToken`.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Records in the `data` list of a response
pub fn extract_data(body: &JsonValue) -> Result<Vec<JsonObject>> {
    let data = body
        .get("data")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::decode("response has no `data` list"))?;

    data.iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::Object(map) => Ok(map.clone()),
            other => Err(Error::decode(format!(
                "`data[{i}]` is not an object: {other}"
            ))),
        })
        .collect()
}

/// Token for the next page, if the response has more
pub fn next_page_token(body: &JsonValue) -> Option<String> {
    body.get("nextPageToken")
        .and_then(JsonValue::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from)
}
