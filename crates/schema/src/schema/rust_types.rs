//! Column type to Rust type mapping
//!
//! Model generators read live columns back through the processors and need a
//! Rust type for each one. Entries are matched in order against the column's
//! full native type; the first match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;
use crate::schema::types::Column;

/// One pattern to Rust type entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RustType {
    /// Case-insensitive regex matched against the native column type
    pub pattern: String,
    pub rust_type: String,
    /// Type used when the column is nullable; `Option<rust_type>` when unset
    #[serde(default)]
    pub nullable_type: Option<String>,
    /// Import the generated code needs, e.g. `chrono::NaiveDateTime`
    #[serde(default)]
    pub import: Option<String>,
}

impl RustType {
    pub fn new(pattern: impl Into<String>, rust_type: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            rust_type: rust_type.into(),
            nullable_type: None,
            import: None,
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import = Some(import.into());
        self
    }

    pub fn with_nullable_type(mut self, nullable_type: impl Into<String>) -> Self {
        self.nullable_type = Some(nullable_type.into());
        self
    }
}

/// Additional mappings registered through `Schema::extend`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extension {
    #[serde(default)]
    pub rust_types: Vec<RustType>,
}

impl Extension {
    pub fn new(rust_types: Vec<RustType>) -> Self {
        Self { rust_types }
    }
}

/// Ordered type table with compiled patterns
#[derive(Debug, Clone)]
pub struct RustTypeMapper {
    entries: Vec<(RustType, Regex)>,
}

impl Default for RustTypeMapper {
    fn default() -> Self {
        let entries = default_rust_types()
            .into_iter()
            .filter_map(|ty| compile(&ty.pattern).ok().map(|regex| (ty, regex)))
            .collect();
        Self { entries }
    }
}

impl RustTypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension
    ///
    /// An entry whose pattern already exists replaces it in place; new
    /// patterns go to the front so they win over the defaults.
    pub fn extend(&mut self, extension: Extension) -> SchemaResult<()> {
        let mut prepended: Vec<(RustType, Regex)> = Vec::new();

        for ty in extension.rust_types {
            let regex = compile(&ty.pattern)?;
            match self.entries.iter_mut().find(|(existing, _)| existing.pattern == ty.pattern) {
                Some(entry) => *entry = (ty, regex),
                None => match prepended.iter_mut().find(|(existing, _)| existing.pattern == ty.pattern) {
                    Some(entry) => *entry = (ty, regex),
                    None => prepended.push((ty, regex)),
                },
            }
        }

        prepended.append(&mut self.entries);
        self.entries = prepended;
        Ok(())
    }

    pub fn types(&self) -> impl Iterator<Item = &RustType> {
        self.entries.iter().map(|(ty, _)| ty)
    }

    /// Find the entry for a native type
    pub fn lookup(&self, native_type: &str) -> Option<&RustType> {
        self.entries
            .iter()
            .find(|(_, regex)| regex.is_match(native_type))
            .map(|(ty, _)| ty)
    }

    /// Rust type for a live column; unknown types fall back to `String`
    pub fn resolve(&self, column: &Column) -> String {
        let native = if column.column_type.is_empty() {
            &column.type_name
        } else {
            &column.column_type
        };

        let Some(ty) = self.lookup(native) else {
            return if column.nullable {
                "Option<String>".to_string()
            } else {
                "String".to_string()
            };
        };

        if !column.nullable {
            return ty.rust_type.clone();
        }
        ty.nullable_type
            .clone()
            .unwrap_or_else(|| format!("Option<{}>", ty.rust_type))
    }
}

fn compile(pattern: &str) -> SchemaResult<Regex> {
    Ok(Regex::new(&format!("(?i){}", pattern))?)
}

/// Built-in table shared by every dialect
pub fn default_rust_types() -> Vec<RustType> {
    vec![
        RustType::new(r"^(tinyint\(1\)|(bool|boolean|bit)\b)", "bool"),
        RustType::new(r"^(tinyint|int1|int2|smallint|smallserial)\b", "i16"),
        RustType::new(r"^(bigint|int8|bigserial)\b", "i64"),
        RustType::new(r"^(int|integer|int4|mediumint|serial)\b", "i32"),
        RustType::new(r"^(real|float4|float\(([1-9]|1[0-9]|2[0-4])\))", "f32"),
        RustType::new(r"^(double|float|float8)", "f64"),
        RustType::new(r"^(decimal|numeric|money|smallmoney)\b", "String"),
        RustType::new(r"^(uuid|uniqueidentifier)\b", "Uuid").with_import("uuid::Uuid"),
        RustType::new(r"^(jsonb?)\b", "serde_json::Value"),
        RustType::new(r"^date$", "NaiveDate").with_import("chrono::NaiveDate"),
        RustType::new(r"^time(\(\d+\))?( without time zone)?$", "NaiveTime").with_import("chrono::NaiveTime"),
        RustType::new(
            r"^(timestamp(\(\d+\))? with time zone|timestamptz|datetimeoffset)",
            "DateTime<Utc>",
        )
        .with_import("chrono::{DateTime, Utc}"),
        RustType::new(r"^(timestamp|datetime|datetime2|smalldatetime)", "NaiveDateTime")
            .with_import("chrono::NaiveDateTime"),
        RustType::new(r"^(blob|tinyblob|mediumblob|longblob|bytea|binary|varbinary|image)", "Vec<u8>"),
        RustType::new(
            r"^(char|varchar|character|nchar|nvarchar|text|tinytext|mediumtext|longtext|ntext|enum|set|citext)",
            "String",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(column_type: &str, nullable: bool) -> Column {
        Column {
            name: "c".into(),
            column_type: column_type.into(),
            type_name: column_type.split('(').next().unwrap_or_default().into(),
            nullable,
            default: None,
            comment: None,
            collation: None,
            autoincrement: false,
        }
    }

    #[test]
    fn test_default_mappings() {
        let mapper = RustTypeMapper::new();
        assert_eq!(mapper.resolve(&column("tinyint(1)", false)), "bool");
        assert_eq!(mapper.resolve(&column("tinyint", false)), "i16");
        assert_eq!(mapper.resolve(&column("bigint unsigned", false)), "i64");
        assert_eq!(mapper.resolve(&column("integer", false)), "i32");
        assert_eq!(mapper.resolve(&column("varchar(255)", true)), "Option<String>");
        assert_eq!(mapper.resolve(&column("character varying(255)", false)), "String");
        assert_eq!(mapper.resolve(&column("timestamp(0) without time zone", false)), "NaiveDateTime");
        assert_eq!(mapper.resolve(&column("timestamp(0) with time zone", false)), "DateTime<Utc>");
        assert_eq!(mapper.resolve(&column("uuid", false)), "Uuid");
        assert_eq!(mapper.resolve(&column("jsonb", true)), "Option<serde_json::Value>");
        assert_eq!(mapper.resolve(&column("geometry", false)), "String");
    }

    #[test]
    fn test_extend_overrides_and_prepends() {
        let mut mapper = RustTypeMapper::new();
        let before = mapper.types().count();

        mapper
            .extend(Extension::new(vec![
                RustType::new(r"^(decimal|numeric|money|smallmoney)\b", "Decimal")
                    .with_import("rust_decimal::Decimal"),
                RustType::new(r"^geometry", "Geometry").with_nullable_type("MaybeGeometry"),
            ]))
            .unwrap();

        assert_eq!(mapper.types().count(), before + 1);
        assert_eq!(mapper.types().next().map(|ty| ty.rust_type.as_str()), Some("Geometry"));
        assert_eq!(mapper.resolve(&column("decimal(8, 2)", false)), "Decimal");
        assert_eq!(mapper.resolve(&column("geometry", true)), "MaybeGeometry");
    }

    #[test]
    fn test_extend_rejects_invalid_pattern() {
        let mut mapper = RustTypeMapper::new();
        assert!(mapper.extend(Extension::new(vec![RustType::new("(", "X")])).is_err());
    }
}
