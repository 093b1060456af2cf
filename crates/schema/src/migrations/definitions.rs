//! Migration Definitions - Core types and structures for migrations
//!
//! Defines the [`Migration`] contract, the ledger record and the results the
//! migrator reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SchemaResult;
use crate::schema::Schema;

/// A reversible schema change
///
/// `signature` is the unique name recorded in the ledger, conventionally the
/// migration file stem (`2024_01_15_093000_create_users_table`).
#[async_trait]
pub trait Migration: Send + Sync {
    fn signature(&self) -> &str;

    async fn up(&self, schema: &Schema) -> SchemaResult<()>;

    async fn down(&self, schema: &Schema) -> SchemaResult<()>;

    /// Named connection to run on; the default connection when `None`
    fn connection(&self) -> Option<&str> {
        None
    }
}

/// A migration written as raw SQL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlMigration {
    pub signature: String,
    /// Statements to apply, separated by `;`
    pub up_sql: String,
    /// Statements to revert, separated by `;`
    pub down_sql: String,
    #[serde(default)]
    pub connection: Option<String>,
}

impl SqlMigration {
    pub fn new(signature: impl Into<String>, up_sql: impl Into<String>, down_sql: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
            connection: None,
        }
    }

    pub fn on_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    async fn apply(&self, schema: &Schema, sql: &str) -> SchemaResult<()> {
        let statements = split_sql_statements(sql);
        if statements.is_empty() {
            warn!(migration = %self.signature, "migration has no statements");
        }
        for statement in statements {
            schema.sql(&statement).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Migration for SqlMigration {
    fn signature(&self) -> &str {
        &self.signature
    }

    async fn up(&self, schema: &Schema) -> SchemaResult<()> {
        self.apply(schema, &self.up_sql).await
    }

    async fn down(&self, schema: &Schema) -> SchemaResult<()> {
        self.apply(schema, &self.down_sql).await
    }

    fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}

/// Split a script on `;` outside of string literals
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_literal = false;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                current.push(ch);
            }
            ';' if !in_literal => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Insertion sequence
    pub id: i64,
    /// Migration signature
    pub migration: String,
    /// Batch number (for grouping migrations)
    pub batch: i64,
}

/// Status of a registered migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub name: String,
    /// Batch it ran in; `None` while pending
    pub batch: Option<i64>,
    pub ran: bool,
}

/// Result of running migrations
#[derive(Debug, Clone, Default)]
pub struct MigrationRunResult {
    /// Signatures of migrations that were applied, in order
    pub applied_migrations: Vec<String>,
    /// Batch they were logged under; 0 when nothing ran
    pub batch: i64,
    /// Number of migrations that were skipped (already applied)
    pub skipped_count: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

impl MigrationRunResult {
    pub fn applied_count(&self) -> usize {
        self.applied_migrations.len()
    }
}

/// Result of rolling back migrations
#[derive(Debug, Clone, Default)]
pub struct RollbackResult {
    /// Signatures of migrations that were rolled back, most recent first
    pub rolled_back_migrations: Vec<String>,
    /// Ledger entries with no registered migration; left in place
    pub missing_migrations: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

impl RollbackResult {
    pub fn rolled_back_count(&self) -> usize {
        self.rolled_back_migrations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements(
            "create table a (id integer);\n insert into a values (1);\ninsert into notes values ('x;y');  ",
        );
        assert_eq!(
            statements,
            vec![
                "create table a (id integer)".to_string(),
                "insert into a values (1)".to_string(),
                "insert into notes values ('x;y')".to_string(),
            ]
        );
        assert!(split_sql_statements(" ;\n; ").is_empty());
    }

    #[test]
    fn test_sql_migration_connection() {
        let migration = SqlMigration::new("2024_01_01_000000_create_a", "create table a (id integer)", "drop table a");
        assert_eq!(migration.connection(), None);
        assert_eq!(migration.on_connection("reporting").connection(), Some("reporting"));
    }
}
