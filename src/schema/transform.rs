//! Record transformer
//!
//! Coerces raw records (decoded JSON or CSV strings) into the types their
//! stream schema declares. Rules:
//!
//! - `type` may be a single name or a list; `null` is accepted only if listed
//! - strings convert to integer, number and boolean; numbers and booleans
//!   convert to string
//! - `format: date-time` strings are normalised to RFC 3339 UTC
//! - empty strings become `null` for nullable non-string and date-time fields
//! - properties the schema does not declare are removed
//! - a value that cannot be coerced is an error when the field is required
//!   (or a key property), and is dropped otherwise

use crate::catalog::KEY_PROPERTIES;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

/// A value that does not fit its schema
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mismatch {
    path: String,
    message: String,
}

impl Mismatch {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

type Coerced<T> = std::result::Result<T, Mismatch>;

/// Schema-driven record transformer for one stream
#[derive(Debug, Clone)]
pub struct Transformer<'a> {
    stream: &'a str,
    schema: &'a JsonValue,
    key_properties: &'a [&'a str],
}

impl<'a> Transformer<'a> {
    /// Transformer keyed on the tap's key properties
    pub fn new(stream: &'a str, schema: &'a JsonValue) -> Self {
        Self {
            stream,
            schema,
            key_properties: KEY_PROPERTIES,
        }
    }

    /// Use different key properties
    #[must_use]
    pub fn with_key_properties(mut self, key_properties: &'a [&'a str]) -> Self {
        self.key_properties = key_properties;
        self
    }

    /// Coerce a raw record into a schema-conformant one
    pub fn transform(&self, record: &JsonObject) -> Result<JsonObject> {
        let mut required = required_fields(self.schema);
        for key in self.key_properties {
            if !required.contains(key) {
                required.push(*key);
            }
        }

        self.transform_object(record, self.schema, "", &required)
            .map_err(|m| Error::transform(self.stream, m.path, m.message))
    }

    fn transform_object(
        &self,
        object: &JsonObject,
        schema: &JsonValue,
        path: &str,
        required: &[&str],
    ) -> Coerced<JsonObject> {
        let properties = schema.get("properties").and_then(JsonValue::as_object);
        let mut out = JsonObject::new();

        for (key, value) in object {
            let field_path = join_path(path, key);

            // Objects without declared properties are free-form
            let Some(properties) = properties else {
                out.insert(key.clone(), value.clone());
                continue;
            };

            let Some(field_schema) = properties.get(key) else {
                debug!("Removed '{field_path}' from {} record: not in schema", self.stream);
                continue;
            };

            match self.transform_value(value, field_schema, &field_path) {
                Ok(v) => {
                    out.insert(key.clone(), v);
                }
                Err(m) if required.contains(&key.as_str()) => return Err(m),
                Err(m) => {
                    warn!(
                        "Dropped '{}' from {} record: {}",
                        m.path, self.stream, m.message
                    );
                }
            }
        }

        for field in required {
            if !out.contains_key(*field) {
                return Err(Mismatch::new(
                    join_path(path, field),
                    "required field is missing",
                ));
            }
        }

        Ok(out)
    }

    fn transform_value(&self, value: &JsonValue, schema: &JsonValue, path: &str) -> Coerced<JsonValue> {
        let types = schema_types(schema);
        if types.is_empty() {
            return Ok(value.clone());
        }

        let nullable = types.contains(&"null");
        if value.is_null() {
            return if nullable {
                Ok(JsonValue::Null)
            } else {
                Err(Mismatch::new(path, "null is not allowed"))
            };
        }

        if let JsonValue::String(s) = value {
            if s.is_empty() && nullable && (!types.contains(&"string") || is_datetime(schema)) {
                return Ok(JsonValue::Null);
            }
        }

        let mut nested_failure = None;
        for ty in types.iter().filter(|t| **t != "null") {
            match self.coerce(value, ty, schema, path) {
                Ok(Some(v)) => return Ok(v),
                Ok(None) => {}
                Err(m) => nested_failure = Some(m),
            }
        }

        Err(nested_failure.unwrap_or_else(|| {
            Mismatch::new(
                path,
                format!("cannot convert {} to {}", describe(value), types.join(" or ")),
            )
        }))
    }

    fn coerce(
        &self,
        value: &JsonValue,
        ty: &str,
        schema: &JsonValue,
        path: &str,
    ) -> Coerced<Option<JsonValue>> {
        let coerced = match ty {
            "string" => {
                if is_datetime(schema) {
                    value.as_str().and_then(normalize_datetime).map(JsonValue::String)
                } else {
                    to_string(value)
                }
            }
            "integer" => to_integer(value),
            "number" => to_number(value),
            "boolean" => to_boolean(value),
            "object" => {
                let Some(object) = as_structured(value, JsonValue::as_object) else {
                    return Ok(None);
                };
                let required = required_fields(schema);
                let out = self.transform_object(&object, schema, path, &required)?;
                Some(JsonValue::Object(out))
            }
            "array" => {
                let Some(items) = as_structured(value, JsonValue::as_array) else {
                    return Ok(None);
                };
                let out = match schema.get("items") {
                    Some(item_schema) => items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.transform_value(item, item_schema, &format!("{path}[{i}]")))
                        .collect::<Coerced<Vec<_>>>()?,
                    None => items,
                };
                Some(JsonValue::Array(out))
            }
            _ => None,
        };

        Ok(coerced)
    }
}

/// Names listed in a schema's `required` array
fn required_fields(schema: &JsonValue) -> Vec<&str> {
    schema
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|r| r.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default()
}

fn is_datetime(schema: &JsonValue) -> bool {
    schema.get("format").and_then(JsonValue::as_str) == Some("date-time")
}

/// Type names declared by a schema
fn schema_types(schema: &JsonValue) -> Vec<&str> {
    match schema.get("type") {
        Some(JsonValue::String(t)) => vec![t.as_str()],
        Some(JsonValue::Array(types)) => types.iter().filter_map(JsonValue::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Structured value, also accepting a JSON-encoded string (CSV cells)
fn as_structured<T: Clone>(value: &JsonValue, pick: fn(&JsonValue) -> Option<&T>) -> Option<T> {
    if let Some(v) = pick(value) {
        return Some(v.clone());
    }
    let parsed: JsonValue = serde_json::from_str(value.as_str()?).ok()?;
    pick(&parsed).cloned()
}

fn to_string(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::String(_) => Some(value.clone()),
        JsonValue::Number(n) => Some(JsonValue::String(n.to_string())),
        JsonValue::Bool(b) => Some(JsonValue::String(b.to_string())),
        _ => None,
    }
}

/// Floats in this range convert to `i64` without clamping
const I64_RANGE: std::ops::Range<f64> = -9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0;

#[allow(clippy::cast_possible_truncation)]
fn to_integer(value: &JsonValue) -> Option<JsonValue> {
    let whole = |f: f64| {
        (f.fract() == 0.0 && I64_RANGE.contains(&f)).then(|| JsonValue::from(f as i64))
    };
    match value {
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        JsonValue::Number(n) => n.as_f64().and_then(whole),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .map(JsonValue::from)
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

fn to_number(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Number(_) => Some(value.clone()),
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(JsonValue::from(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number)
        }
        _ => None,
    }
}

fn to_boolean(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Bool(_) => Some(value.clone()),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(JsonValue::Bool(true)),
            "false" | "0" => Some(JsonValue::Bool(false)),
            _ => None,
        },
        JsonValue::Number(n) => match n.as_i64() {
            Some(1) => Some(JsonValue::Bool(true)),
            Some(0) => Some(JsonValue::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Parse the date-time shapes Wrike emits and render them as RFC 3339 UTC
pub fn normalize_datetime(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let render = |dt: DateTime<Utc>| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true);

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(render(dt.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(render(naive.and_utc()));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| render(naive.and_utc()))
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn describe(value: &JsonValue) -> String {
    let kind = match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    };
    let mut shown = value.to_string();
    if shown.len() > 40 {
        let cut = (0..=40).rev().find(|i| shown.is_char_boundary(*i)).unwrap_or(0);
        shown.truncate(cut);
        shown.push_str("...");
    }
    format!("{kind} {shown}")
}
