//! Core Executor Traits
//!
//! This module defines the narrow surface the schema engine needs from a
//! database driver: execute a statement, fetch rows, and report its dialect.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::Dialect;
use crate::error::{SchemaError, SchemaResult};

/// SQL executor for one named connection
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute a statement and return the affected row count
    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<u64>;

    /// Execute a query and return every row
    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<Vec<DatabaseRow>>;

    /// Dialect spoken by this executor
    fn dialect(&self) -> Dialect;
}

/// Database value enumeration for parameter binding and row decoding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Render the value as text, the way introspection columns are compared
    pub fn to_text(&self) -> Option<String> {
        match self {
            DatabaseValue::Null => None,
            DatabaseValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            DatabaseValue::Int(i) => Some(i.to_string()),
            DatabaseValue::Float(f) => Some(f.to_string()),
            DatabaseValue::String(s) => Some(s.clone()),
            DatabaseValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            DatabaseValue::Json(j) => Some(j.to_string()),
        }
    }

    /// Interpret the value as an integer
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Bool(b) => Some(i64::from(*b)),
            DatabaseValue::Int(i) => Some(*i),
            DatabaseValue::Float(f) => Some(*f as i64),
            DatabaseValue::String(s) => s.trim().parse().ok(),
            DatabaseValue::Bytes(b) => String::from_utf8_lossy(b).trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a boolean; accepts `1`, `t`, `true`, `yes`
    pub fn to_bool(&self) -> bool {
        match self {
            DatabaseValue::Bool(b) => *b,
            DatabaseValue::Int(i) => *i != 0,
            DatabaseValue::Float(f) => *f != 0.0,
            DatabaseValue::Null => false,
            other => other
                .to_text()
                .map(|text| truthy(&text))
                .unwrap_or(false),
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int(i) => JsonValue::from(*i),
            DatabaseValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }

    /// Create a bindable value from a JSON scalar
    ///
    /// Arrays and objects stay JSON; their SQL form is the encoded document.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => DatabaseValue::Null,
            JsonValue::Bool(b) => DatabaseValue::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => DatabaseValue::Int(i),
                None => n.as_f64().map(DatabaseValue::Float).unwrap_or(DatabaseValue::Null),
            },
            JsonValue::String(s) => DatabaseValue::String(s.clone()),
            other => DatabaseValue::Json(other.clone()),
        }
    }
}

/// Text truthiness shared by the processors
pub fn truthy(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "1" | "t" | "true" | "yes" | "y"
    )
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int(i64::from(value))
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// One result row, columns kept in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseRow {
    columns: Vec<(String, DatabaseValue)>,
}

impl DatabaseRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value
    pub fn push(&mut self, name: impl Into<String>, value: DatabaseValue) {
        self.columns.push((name.into(), value));
    }

    /// Builder-style variant of [`push`](Self::push)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.push(name, value.into());
        self
    }

    /// Get a column value by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&DatabaseValue> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Get a column value by index
    pub fn get_by_index(&self, index: usize) -> Option<&DatabaseValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Required text column
    pub fn get_string(&self, name: &str) -> SchemaResult<String> {
        self.get_optional_string(name)
            .ok_or_else(|| SchemaError::decode(format!("column '{}' is missing or null", name)))
    }

    /// Nullable text column
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        self.get(name).and_then(DatabaseValue::to_text)
    }

    /// Integer column, missing and null read as `None`
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(DatabaseValue::to_i64)
    }

    /// Boolean column, missing and null read as `false`
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).map(DatabaseValue::to_bool).unwrap_or(false)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Convert row to JSON object
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        JsonValue::Object(map)
    }
}
