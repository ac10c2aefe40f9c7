//! Parsed input records and value rendering.
//!
//! A [`Record`] is one line of line-delimited JSON that parsed to an object.
//! Anything else (invalid JSON, arrays, scalars, invalid UTF-8) is not a
//! record and is rejected by [`Record::parse`].
//!
//! Values render to CSV text as follows:
//! - strings verbatim
//! - integers in decimal
//! - floats with six fractional digits (`12.5` becomes `12.500000`)
//! - booleans as `true` / `false`
//! - null, arrays and objects have no scalar rendering

use serde_json::{Map, Value};

/// Field holding the dotted device identifier.
pub const DEVICE_ID_FIELD: &str = "DevID";

/// Identifier used when a record carries no usable `DevID`.
pub const UNKNOWN_DEVICE: &str = "unknown";

/// A key-value document parsed from one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Parse one input line. Returns `None` unless the line is a JSON object.
    pub fn parse(line: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(line) {
            Ok(Value::Object(fields)) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Raw value for a field, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Scalar text for `key`, or `default` when the field is absent, null
    /// or not a scalar.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(render_scalar)
            .unwrap_or_else(|| default.to_string())
    }

    /// Render a list field, joining its scalar items with `separator`.
    ///
    /// Missing and null fields render as the empty string. A scalar in place
    /// of a list renders as itself.
    pub fn list_text(&self, key: &str, separator: &str) -> String {
        match self.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(render_scalar)
                .collect::<Vec<_>>()
                .join(separator),
            Some(other) => render_scalar(other).unwrap_or_default(),
        }
    }

    /// Scalar text of the first item of a list field, or `default` when the
    /// field is not a non-empty list.
    pub fn first_text(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .first()
                .and_then(render_scalar)
                .unwrap_or_else(|| default.to_string()),
            _ => default.to_string(),
        }
    }

    /// Scalar text of `field` inside the first object of a list field, e.g.
    /// `Ownership[0].Owner`.
    pub fn first_object_text(&self, key: &str, field: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .first()
                .and_then(Value::as_object)
                .and_then(|obj| obj.get(field))
                .and_then(render_scalar)
                .unwrap_or_else(|| default.to_string()),
            _ => default.to_string(),
        }
    }

    /// The dotted device identifier, or `"unknown"` when absent.
    pub fn device_id(&self) -> String {
        self.text_or(DEVICE_ID_FIELD, UNKNOWN_DEVICE)
    }
}

/// Render a JSON scalar as CSV text. Returns `None` for null, arrays and
/// objects.
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| format!("{f:.6}"))
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
