//! Canonical introspection results
//!
//! Every processor normalizes its dialect's catalog rows into these shapes.

use serde::{Deserialize, Serialize};

/// A live table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub schema: String,
    /// Size in bytes, when the dialect reports it
    pub size: Option<i64>,
    pub comment: Option<String>,
}

/// A live view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    pub schema: String,
    pub definition: String,
}

/// A live column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Full native type, e.g. `varchar(255)`
    pub column_type: String,
    /// Bare type family, e.g. `varchar`
    pub type_name: String,
    pub nullable: bool,
    /// Raw default expression as stored by the database
    pub default: Option<String>,
    pub comment: Option<String>,
    pub collation: Option<String>,
    pub autoincrement: bool,
}

/// A live index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    /// Access method, e.g. `btree` or `nonclustered`; empty on SQLite
    pub index_type: String,
    pub primary: bool,
    pub unique: bool,
}

/// A live foreign key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name; empty on SQLite
    pub name: String,
    pub columns: Vec<String>,
    pub foreign_schema: String,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
    pub on_update: String,
    pub on_delete: String,
}

/// A user-defined type (PostgreSQL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    pub schema: String,
    /// Kind, e.g. `enum`, `composite`, `domain`
    pub kind: String,
    pub category: String,
    pub implicit: bool,
}
