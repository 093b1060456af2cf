//! # elif-schema: Schema Builder and Migrations for elif.rs
//!
//! Multi-dialect schema layer: a fluent [`Blueprint`] is compiled by a
//! per-database [`Grammar`] into DDL for PostgreSQL, MySQL, SQLite or SQL
//! Server; live schemas are read back through catalog queries and normalized
//! by a [`Processor`]; and a [`Migrator`] applies registered migrations in
//! batches tracked by a ledger table.
//!
//! ```no_run
//! use elif_schema::{ConnectionConfig, Dialect, Schema, SqliteExecutor};
//! use std::sync::Arc;
//!
//! # async fn example() -> elif_schema::SchemaResult<()> {
//! let executor = Arc::new(SqliteExecutor::memory().await?);
//! let schema = Schema::with_executor(ConnectionConfig::new(Dialect::Sqlite, "sqlite::memory:"), executor)?;
//!
//! schema
//!     .create("users", |table| {
//!         table.id();
//!         table.string("email", None).unique();
//!         table.timestamps(None);
//!     })
//!     .await?;
//!
//! assert!(schema.has_column("users", "email").await?);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod migrations;
pub mod schema;

// Re-export core traits and types
pub use backends::{connect, DatabaseRow, DatabaseValue, Dialect, Executor};
pub use backends::{MySqlExecutor, PostgresExecutor, SqliteExecutor};
pub use config::{ConnectionConfig, DatabaseConfig, MigrationsConfig};
pub use error::{SchemaError, SchemaResult};
pub use migrations::{
    Migration, MigrationCreator, MigrationRecord, MigrationRepository, MigrationRunResult, MigrationStatus, Migrator,
    RollbackResult, SqlMigration,
};
pub use schema::{
    Blueprint, Column, ColumnDefinition, ColumnType, CompiledSql, DefaultValue, Extension, ForeignKey, Grammar, Index,
    JsonPath, Processor, RustType, Schema, SchemaBuilder, Table, Type, View,
};
