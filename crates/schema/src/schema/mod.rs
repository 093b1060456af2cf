//! Schema definition, compilation and introspection
//!
//! - [`Blueprint`] collects columns and commands for one table
//! - [`Grammar`] compiles a blueprint into dialect SQL
//! - [`Processor`] maps catalog rows back to the canonical [`types`]
//! - [`Schema`] ties them to named connections

pub mod blueprint;
pub mod column;
pub mod command;
pub mod driver;
pub mod facade;
pub mod grammars;
pub mod json;
pub mod processors;
pub mod rust_types;
pub mod types;

pub use blueprint::Blueprint;
pub use column::{ColumnDefinition, ColumnType, DefaultValue};
pub use command::{Command, CommandKind, ForeignKeyDefinition, IndexDefinition};
pub use driver::Driver;
pub use facade::{Schema, SchemaBuilder};
pub use grammars::{Grammar, LockClause, LockPosition, PlaceholderStyle};
pub use json::{CompiledSql, JsonPath, JsonSegment};
pub use processors::Processor;
pub use rust_types::{Extension, RustType, RustTypeMapper};
pub use types::{Column, ForeignKey, Index, Table, Type, View};
