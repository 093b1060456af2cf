//! Migration Repository - the ledger of migrations that have run
//!
//! One table with `(id, migration, batch)` columns. `id` is an
//! auto-increment key, so it doubles as the insertion sequence used to order
//! records within a batch.

use crate::backends::{DatabaseRow, DatabaseValue};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;

use super::definitions::MigrationRecord;

/// Ledger stored on a schema's connection
#[derive(Debug, Clone)]
pub struct MigrationRepository {
    schema: Schema,
    table: String,
}

impl MigrationRepository {
    pub fn new(schema: Schema, table: impl Into<String>) -> Self {
        Self {
            schema,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the ledger table; callers check [`repository_exists`](Self::repository_exists) first
    pub async fn create_repository(&self) -> SchemaResult<()> {
        self.schema
            .create(&self.table, |table| {
                table.increments("id");
                table.string("migration", None);
                table.integer("batch");
            })
            .await
    }

    pub async fn repository_exists(&self) -> SchemaResult<bool> {
        self.schema.has_table(&self.table).await
    }

    pub async fn delete_repository(&self) -> SchemaResult<()> {
        self.schema.drop_if_exists(&self.table).await
    }

    /// Record that a migration ran
    pub async fn log(&self, migration: &str, batch: i64) -> SchemaResult<()> {
        let sql = format!(
            "insert into {} ({}, {}) values (?, ?)",
            self.wrapped_table(),
            self.wrap("migration"),
            self.wrap("batch")
        );
        self.schema
            .driver()
            .execute(&sql, &[DatabaseValue::from(migration), DatabaseValue::Int(batch)])
            .await?;
        Ok(())
    }

    /// Remove a migration from the ledger
    pub async fn delete(&self, migration: &str) -> SchemaResult<()> {
        let sql = format!(
            "delete from {} where {} = ?",
            self.wrapped_table(),
            self.wrap("migration")
        );
        self.schema.driver().execute(&sql, &[DatabaseValue::from(migration)]).await?;
        Ok(())
    }

    /// Highest batch number, 0 when the ledger is empty
    pub async fn get_last_batch_number(&self) -> SchemaResult<i64> {
        let sql = format!("select max({}) as {} from {}", self.wrap("batch"), self.wrap("batch"), self.wrapped_table());
        let rows = self.schema.driver().select(&sql, &[]).await?;
        Ok(rows.first().and_then(|row| row.get_i64("batch")).unwrap_or(0))
    }

    pub async fn get_next_batch_number(&self) -> SchemaResult<i64> {
        Ok(self.get_last_batch_number().await? + 1)
    }

    /// Every migration name that has run, oldest first
    pub async fn get_ran(&self) -> SchemaResult<Vec<String>> {
        let sql = format!(
            "select {} from {} order by {} asc, {} asc",
            self.wrap("migration"),
            self.wrapped_table(),
            self.wrap("batch"),
            self.wrap("id")
        );
        let rows = self.schema.driver().select(&sql, &[]).await?;
        rows.iter().map(|row| row.get_string("migration")).collect()
    }

    /// Every record, most recent batch first and most recently logged first within a batch
    pub async fn get_migrations(&self) -> SchemaResult<Vec<MigrationRecord>> {
        let sql = format!(
            "select {} from {} order by {} desc, {} desc",
            self.columns(),
            self.wrapped_table(),
            self.wrap("batch"),
            self.wrap("id")
        );
        self.records(&sql, &[]).await
    }

    /// The `steps` most recent records
    pub async fn get_migrations_by_step(&self, steps: usize) -> SchemaResult<Vec<MigrationRecord>> {
        let mut records = self.get_migrations().await?;
        records.truncate(steps);
        Ok(records)
    }

    /// Records in one batch, most recently logged first
    pub async fn get_migrations_by_batch(&self, batch: i64) -> SchemaResult<Vec<MigrationRecord>> {
        let sql = format!(
            "select {} from {} where {} = ? order by {} desc",
            self.columns(),
            self.wrapped_table(),
            self.wrap("batch"),
            self.wrap("id")
        );
        self.records(&sql, &[DatabaseValue::Int(batch)]).await
    }

    /// Records of the most recent batch only
    pub async fn get_last(&self) -> SchemaResult<Vec<MigrationRecord>> {
        let last = self.get_last_batch_number().await?;
        if last == 0 {
            return Ok(Vec::new());
        }
        self.get_migrations_by_batch(last).await
    }

    async fn records(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<Vec<MigrationRecord>> {
        let rows = self.schema.driver().select(sql, params).await?;
        rows.iter().map(record_from_row).collect()
    }

    fn columns(&self) -> String {
        format!("{}, {}, {}", self.wrap("id"), self.wrap("migration"), self.wrap("batch"))
    }

    fn wrap(&self, column: &str) -> String {
        self.schema.grammar().wrap(column)
    }

    fn wrapped_table(&self) -> String {
        self.schema
            .grammar()
            .wrap_table_name(&self.table, self.schema.driver().prefix())
    }
}

fn record_from_row(row: &DatabaseRow) -> SchemaResult<MigrationRecord> {
    Ok(MigrationRecord {
        id: row
            .get_i64("id")
            .ok_or_else(|| SchemaError::decode("ledger row without id"))?,
        migration: row.get_string("migration")?,
        batch: row
            .get_i64("batch")
            .ok_or_else(|| SchemaError::decode("ledger row without batch"))?,
    })
}
