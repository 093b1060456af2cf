//! Processors - normalize catalog rows into the canonical model
//!
//! Each dialect's catalog query returns rows in its own vocabulary
//! (`"YES"`/`"NO"` nullability, single-letter action codes, byte lengths).
//! A processor turns the raw rows into [`Column`], [`Index`], [`ForeignKey`]
//! and [`Type`] values that look the same whatever database produced them.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

pub use mysql::MySqlProcessor;
pub use postgres::PostgresProcessor;
pub use sqlite::SqliteProcessor;
pub use sqlserver::SqlServerProcessor;

use crate::backends::{truthy, DatabaseRow, Dialect};
use crate::error::SchemaResult;
use crate::schema::types::{Column, ForeignKey, Index, Table, Type, View};

/// Raw column row as returned by a catalog query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DBColumn {
    pub name: String,
    /// Full native type, when the catalog reports one
    pub column_type: String,
    pub type_name: String,
    /// Nullability in the dialect's own encoding
    pub nullable: String,
    pub default: Option<String>,
    pub comment: Option<String>,
    pub collation: Option<String>,
    pub extra: String,
    pub autoincrement: bool,
    pub primary: bool,
    pub length: i64,
    pub precision: i64,
    pub places: i64,
}

impl DBColumn {
    pub fn from_row(row: &DatabaseRow) -> SchemaResult<Self> {
        Ok(Self {
            name: row.get_string("name")?,
            column_type: row.get_optional_string("type").unwrap_or_default(),
            type_name: row.get_optional_string("type_name").unwrap_or_default(),
            nullable: row.get_optional_string("nullable").unwrap_or_default(),
            default: row.get_optional_string("default"),
            comment: row.get_optional_string("comment"),
            collation: row.get_optional_string("collation"),
            extra: row.get_optional_string("extra").unwrap_or_default(),
            autoincrement: row.get_bool("autoincrement"),
            primary: row.get_bool("primary"),
            length: row.get_i64("length").unwrap_or_default(),
            precision: row.get_i64("precision").unwrap_or_default(),
            places: row.get_i64("places").unwrap_or_default(),
        })
    }
}

/// Raw index row; `columns` is comma separated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DBIndex {
    pub name: String,
    pub columns: String,
    pub index_type: String,
    pub primary: bool,
    pub unique: bool,
}

impl DBIndex {
    pub fn from_row(row: &DatabaseRow) -> SchemaResult<Self> {
        Ok(Self {
            name: row.get_string("name")?,
            columns: row.get_optional_string("columns").unwrap_or_default(),
            index_type: row.get_optional_string("type").unwrap_or_default(),
            primary: row.get_bool("primary"),
            unique: row.get_bool("unique"),
        })
    }
}

/// Raw foreign key row; column lists are comma separated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DBForeignKey {
    pub name: String,
    pub columns: String,
    pub foreign_schema: String,
    pub foreign_table: String,
    pub foreign_columns: String,
    pub on_update: String,
    pub on_delete: String,
}

impl DBForeignKey {
    pub fn from_row(row: &DatabaseRow) -> SchemaResult<Self> {
        Ok(Self {
            name: row.get_optional_string("name").unwrap_or_default(),
            columns: row.get_optional_string("columns").unwrap_or_default(),
            foreign_schema: row.get_optional_string("foreign_schema").unwrap_or_default(),
            foreign_table: row.get_string("foreign_table")?,
            foreign_columns: row.get_optional_string("foreign_columns").unwrap_or_default(),
            on_update: row.get_optional_string("on_update").unwrap_or_default(),
            on_delete: row.get_optional_string("on_delete").unwrap_or_default(),
        })
    }
}

/// Raw user-defined type row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DBType {
    pub name: String,
    pub schema: String,
    pub kind: String,
    pub category: String,
    pub implicit: bool,
}

impl DBType {
    pub fn from_row(row: &DatabaseRow) -> SchemaResult<Self> {
        Ok(Self {
            name: row.get_string("name")?,
            schema: row.get_optional_string("schema").unwrap_or_default(),
            kind: row.get_optional_string("type").unwrap_or_default(),
            category: row.get_optional_string("category").unwrap_or_default(),
            implicit: row.get_bool("implicit"),
        })
    }
}

/// Per-dialect reverse mapping from catalog rows to the canonical model
pub trait Processor: Send + Sync {
    fn process_columns(&self, columns: Vec<DBColumn>) -> Vec<Column>;
    fn process_indexes(&self, indexes: Vec<DBIndex>) -> Vec<Index>;
    fn process_foreign_keys(&self, foreign_keys: Vec<DBForeignKey>) -> Vec<ForeignKey>;

    /// Only PostgreSQL reports user types
    fn process_types(&self, _types: Vec<DBType>) -> Vec<Type> {
        Vec::new()
    }

    fn process_tables(&self, rows: &[DatabaseRow]) -> SchemaResult<Vec<Table>> {
        rows.iter()
            .map(|row| {
                Ok(Table {
                    name: row.get_string("name")?,
                    schema: row.get_optional_string("schema").unwrap_or_default(),
                    size: row.get_i64("size"),
                    comment: row.get_optional_string("comment").filter(|comment| !comment.is_empty()),
                })
            })
            .collect()
    }

    fn process_views(&self, rows: &[DatabaseRow]) -> SchemaResult<Vec<View>> {
        rows.iter()
            .map(|row| {
                Ok(View {
                    name: row.get_string("name")?,
                    schema: row.get_optional_string("schema").unwrap_or_default(),
                    definition: row.get_optional_string("definition").unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Choose the processor for a dialect
pub fn processor_for(dialect: Dialect) -> Box<dyn Processor> {
    match dialect {
        Dialect::MySql => Box::new(MySqlProcessor),
        Dialect::Postgres => Box::new(PostgresProcessor),
        Dialect::Sqlite => Box::new(SqliteProcessor),
        Dialect::SqlServer => Box::new(SqlServerProcessor),
    }
}

/// Split a comma separated column list, dropping empty entries
pub(crate) fn split_columns(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect()
}

/// Nullability encoded as `YES`/`NO`, `t`/`f` or `1`/`0`
pub(crate) fn is_nullable(value: &str) -> bool {
    truthy(value)
}

/// Catalog comments are empty strings when unset on some dialects
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::DatabaseValue;

    #[test]
    fn test_raw_rows_from_database_rows() {
        let row = DatabaseRow::new()
            .with("name", "email")
            .with("type", "varchar(255)")
            .with("type_name", "varchar")
            .with("nullable", "YES")
            .with("default", DatabaseValue::Null)
            .with("extra", "");
        let column = DBColumn::from_row(&row).unwrap();
        assert_eq!(column.column_type, "varchar(255)");
        assert_eq!(column.default, None);
        assert!(!column.autoincrement);

        let row = DatabaseRow::new()
            .with("name", "users_email_unique")
            .with("columns", "email,tenant_id")
            .with("type", "btree")
            .with("unique", true);
        let index = DBIndex::from_row(&row).unwrap();
        assert!(index.unique);
        assert_eq!(split_columns(&index.columns), vec!["email", "tenant_id"]);

        assert!(DBForeignKey::from_row(&DatabaseRow::new().with("name", "fk")).is_err());
    }

    #[test]
    fn test_process_tables_and_views() {
        let processor = processor_for(Dialect::Sqlite);
        let tables = processor
            .process_tables(&[DatabaseRow::new().with("name", "users").with("schema", "main")])
            .unwrap();
        assert_eq!(
            tables,
            vec![Table {
                name: "users".into(),
                schema: "main".into(),
                size: None,
                comment: None,
            }]
        );

        let views = processor
            .process_views(&[DatabaseRow::new()
                .with("name", "active_users")
                .with("definition", "select 1")])
            .unwrap();
        assert_eq!(views[0].definition, "select 1");
        assert_eq!(views[0].schema, "");
    }
}
