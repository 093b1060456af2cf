//! JSON path selectors
//!
//! Selectors like `data->objects[0]->level` are parsed once into a
//! [`JsonPath`]; each grammar then renders the path in its own syntax.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::backends::DatabaseValue;
use crate::error::{SchemaError, SchemaResult};

/// One step into a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSegment {
    Field(String),
    Index(i64),
}

/// Parsed `column->segment->segment[index]` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    pub column: String,
    pub segments: Vec<JsonSegment>,
}

/// SQL fragment with its positional bindings
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    pub sql: String,
    pub bindings: Vec<DatabaseValue>,
}

impl CompiledSql {
    pub fn new(sql: impl Into<String>, bindings: Vec<DatabaseValue>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }
}

impl JsonPath {
    /// Parse a selector
    pub fn parse(selector: &str) -> SchemaResult<Self> {
        let mut parts = selector.split("->");
        let head = parts.next().unwrap_or_default().trim();

        let (column, mut segments) = split_indexes(head, selector)?;
        if column.is_empty() {
            return Err(SchemaError::compilation(format!(
                "json selector '{}' has no column",
                selector
            )));
        }

        for part in parts {
            let part = part.trim().trim_start_matches('>');
            let (field, indexes) = split_indexes(part, selector)?;
            if field.is_empty() && indexes.is_empty() {
                return Err(SchemaError::compilation(format!(
                    "json selector '{}' has an empty segment",
                    selector
                )));
            }
            if !field.is_empty() {
                segments.push(match field.parse::<i64>() {
                    Ok(index) => JsonSegment::Index(index),
                    Err(_) => JsonSegment::Field(field),
                });
            }
            segments.extend(indexes);
        }

        Ok(Self { column, segments })
    }

    /// Whether the selector goes into the document at all
    pub fn has_path(&self) -> bool {
        !self.segments.is_empty()
    }

    /// JSONPath form, `$."a"[0]."b"`
    pub fn to_json_path(&self) -> String {
        json_path(&self.segments)
    }

    /// The selector minus its last segment, and that segment
    pub fn split_last(&self) -> (JsonPath, Option<JsonSegment>) {
        let mut parent = self.clone();
        let last = parent.segments.pop();
        (parent, last)
    }
}

/// Render segments as a JSONPath string
pub fn json_path(segments: &[JsonSegment]) -> String {
    let mut path = String::from("$");
    for segment in segments {
        match segment {
            JsonSegment::Field(field) => {
                path.push_str(".\"");
                path.push_str(&field.replace('"', "\\\""));
                path.push('"');
            }
            JsonSegment::Index(index) => {
                path.push_str(&format!("[{}]", index));
            }
        }
    }
    path
}

fn split_indexes(part: &str, selector: &str) -> SchemaResult<(String, Vec<JsonSegment>)> {
    let Some(open) = part.find('[') else {
        return Ok((part.to_string(), Vec::new()));
    };

    let field = part[..open].to_string();
    let mut indexes = Vec::new();
    let mut rest = &part[open..];
    while !rest.is_empty() {
        let close = match (rest.starts_with('['), rest.find(']')) {
            (true, Some(close)) => close,
            _ => {
                return Err(SchemaError::compilation(format!(
                    "json selector '{}' has a malformed array index",
                    selector
                )))
            }
        };
        let index = rest[1..close].trim().parse::<i64>().map_err(|_| {
            SchemaError::compilation(format!(
                "json selector '{}' has a non-numeric array index",
                selector
            ))
        })?;
        indexes.push(JsonSegment::Index(index));
        rest = &rest[close + 1..];
    }

    Ok((field, indexes))
}

/// Normalize a caller value to JSON
pub fn to_json_value<T: Serialize + ?Sized>(value: &T) -> SchemaResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| SchemaError::compilation(format!("value cannot be converted to json: {}", e)))
}

/// Group `column->path` updates by column, keeping first-seen order
pub fn group_updates(values: &[(String, JsonValue)]) -> SchemaResult<Vec<(String, Vec<(JsonPath, JsonValue)>)>> {
    let mut grouped: Vec<(String, Vec<(JsonPath, JsonValue)>)> = Vec::new();
    for (selector, value) in values {
        let path = JsonPath::parse(selector)?;
        if !path.has_path() {
            return Err(SchemaError::compilation(format!(
                "'{}' is not a json path selector",
                selector
            )));
        }
        match grouped.iter_mut().find(|(column, _)| *column == path.column) {
            Some((_, paths)) => paths.push((path, value.clone())),
            None => grouped.push((path.column.clone(), vec![(path, value.clone())])),
        }
    }
    Ok(grouped)
}

/// Scalar binding for dialects that compare element values directly
pub fn scalar_binding(value: &JsonValue, dialect: &str) -> SchemaResult<DatabaseValue> {
    match value {
        JsonValue::Array(_) | JsonValue::Object(_) => Err(SchemaError::compilation(format!(
            "{} can only match scalar json values, got {}",
            dialect, value
        ))),
        other => Ok(DatabaseValue::from_json(other)),
    }
}

/// Scalars to test for containment: each array element, or the value itself
pub fn contained_scalars(value: &JsonValue, dialect: &str) -> SchemaResult<Vec<DatabaseValue>> {
    match value {
        JsonValue::Array(items) => items.iter().map(|item| scalar_binding(item, dialect)).collect(),
        other => Ok(vec![scalar_binding(other, dialect)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_selector() {
        let path = JsonPath::parse("data->objects[0]->level").unwrap();
        assert_eq!(path.column, "data");
        assert_eq!(
            path.segments,
            vec![
                JsonSegment::Field("objects".into()),
                JsonSegment::Index(0),
                JsonSegment::Field("level".into()),
            ]
        );
        assert_eq!(path.to_json_path(), "$.\"objects\"[0].\"level\"");
    }

    #[test]
    fn test_parse_plain_column_and_nested_indexes() {
        let path = JsonPath::parse("data").unwrap();
        assert!(!path.has_path());

        let path = JsonPath::parse("data->matrix[1][2]").unwrap();
        assert_eq!(path.to_json_path(), "$.\"matrix\"[1][2]");
    }

    #[test]
    fn test_parse_errors() {
        assert!(JsonPath::parse("->a").is_err());
        assert!(JsonPath::parse("data->").is_err());
        assert!(JsonPath::parse("data->items[x]").is_err());
        assert!(JsonPath::parse("data->items[0").is_err());
    }

    #[test]
    fn test_group_updates_merges_same_column() {
        let grouped = group_updates(&[
            ("data->name".to_string(), json!("goravel")),
            ("meta->tags".to_string(), json!(["a"])),
            ("data->age".to_string(), json!(3)),
        ])
        .unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "data");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "meta");

        assert!(group_updates(&[("data".to_string(), json!(1))]).is_err());
    }

    #[test]
    fn test_contained_scalars() {
        let values = contained_scalars(&json!(["a", 1]), "sqlite").unwrap();
        assert_eq!(values, vec![DatabaseValue::from("a"), DatabaseValue::Int(1)]);
        assert!(contained_scalars(&json!({"a": 1}), "sqlite").is_err());
    }
}
