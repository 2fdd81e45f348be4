//! Dynamic JSON-like documents.
//!
//! A [`Document`] is a flat string-keyed map of JSON values with lenient typed
//! getters. Result rows of every database backend are materialized as documents,
//! and the same type is used for small JSON configuration files.

use crate::errors::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// A string-keyed map of JSON values.
///
/// Getters never fail: a missing key or a value that cannot be coerced yields
/// `None` (or the supplied default for the `_or` variants). Mutations fail with
/// [`Error::ReadOnly`] once the document has been marked uneditable.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    values: Map<String, Value>,
    editable: bool,
}

impl Document {
    /// Creates an empty, editable document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Map::new(),
            editable: true,
        }
    }

    /// Wraps an existing JSON object map.
    #[must_use]
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values,
            editable: true,
        }
    }

    /// Converts a JSON value into a document. Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self::from_map(values)),
            other => Err(Error::invalid_argument(format!(
                "expected a JSON object, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Parses a JSON object from a string.
    pub fn parse_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Reads a JSON object from a file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::parse_json(&contents)
    }

    /// Writes the document as pretty-printed JSON, creating parent directories as needed.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_pretty_json()?)?;
        Ok(())
    }

    /// Whether [`set`](Self::set), [`remove`](Self::remove) and [`clear`](Self::clear) are allowed.
    #[must_use]
    pub const fn can_edit(&self) -> bool {
        self.editable
    }

    /// Freezes the document. Further mutations fail with [`Error::ReadOnly`].
    #[must_use]
    pub fn mark_uneditable(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) -> Result<&mut Self> {
        self.check_editable()?;
        self.values.insert(path.into(), value.into());
        Ok(self)
    }

    pub fn remove(&mut self, path: &str) -> Result<&mut Self> {
        self.check_editable()?;
        self.values.remove(path);
        Ok(self)
    }

    pub fn clear(&mut self) -> Result<&mut Self> {
        self.check_editable()?;
        self.values.clear();
        Ok(self)
    }

    fn check_editable(&self) -> Result<()> {
        if self.editable {
            Ok(())
        } else {
            Err(Error::ReadOnly)
        }
    }

    /// Raw access to a value. JSON `null` is reported as absent.
    #[must_use]
    pub fn get_object(&self, path: &str) -> Option<&Value> {
        self.values.get(path).filter(|value| !value.is_null())
    }

    /// Reads any scalar as a string; numbers and booleans are formatted.
    #[must_use]
    pub fn get_string(&self, path: &str) -> Option<String> {
        match self.get_object(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn get_string_or(&self, path: &str, default: &str) -> String {
        self.get_string(path).unwrap_or_else(|| default.to_string())
    }

    /// Reads an integer, accepting integral floats and numeric strings.
    #[must_use]
    pub fn get_long(&self, path: &str) -> Option<i64> {
        match self.get_object(path)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_long_or(&self, path: &str, default: i64) -> i64 {
        self.get_long(path).unwrap_or(default)
    }

    /// Like [`get_long`](Self::get_long) but `None` when the value does not fit an `i32`.
    #[must_use]
    pub fn get_int(&self, path: &str) -> Option<i32> {
        self.get_long(path).and_then(|v| i32::try_from(v).ok())
    }

    #[must_use]
    pub fn get_int_or(&self, path: &str, default: i32) -> i32 {
        self.get_int(path).unwrap_or(default)
    }

    #[must_use]
    pub fn get_double(&self, path: &str) -> Option<f64> {
        match self.get_object(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_double_or(&self, path: &str, default: f64) -> f64 {
        self.get_double(path).unwrap_or(default)
    }

    /// Reads a boolean. SQLite stores booleans as `0`/`1`, so numbers are accepted.
    #[must_use]
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        match self.get_object(path)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|v| v != 0),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool_or(&self, path: &str, default: bool) -> bool {
        self.get_bool(path).unwrap_or(default)
    }

    /// Reads a nested document. Objects stored as JSON text (as SQL backends do) are parsed.
    #[must_use]
    pub fn get_document(&self, path: &str) -> Option<Self> {
        match self.get_object(path)? {
            Value::Object(map) => Some(Self::from_map(map.clone())),
            Value::String(s) => Self::parse_json(s).ok(),
            _ => None,
        }
    }

    /// Nested documents of a list. Non-object elements are skipped, `null` elements become empty documents.
    #[must_use]
    pub fn get_document_list(&self, path: &str) -> Vec<Self> {
        self.get_array(path)
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(Self::from_map(map)),
                Value::Null => Some(Self::new()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn get_string_list(&self, path: &str) -> Vec<String> {
        self.get_array(path)
            .into_iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect()
    }

    fn get_array(&self, path: &str) -> Vec<Value> {
        match self.get_object(path) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(s)) => match serde_json::from_str(s) {
                Ok(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Whether `path` holds a value (including JSON `null`).
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Borrow of the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.values).map_err(Into::into)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.values).map_err(Into::into)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(values: Map<String, Value>) -> Self {
        Self::from_map(values)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
