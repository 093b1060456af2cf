//! Migrator - runs and reverts registered migrations against the ledger
//!
//! Migrations run in registration order. Each successful `up` is logged
//! immediately, so a failure part way through a batch leaves the earlier
//! migrations of that batch applied and logged; the error is returned and
//! nothing is compensated. Re-running picks up from the failed migration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::definitions::{Migration, MigrationRecord, MigrationRunResult, MigrationStatus, RollbackResult};
use super::repository::MigrationRepository;
use crate::error::SchemaResult;
use crate::schema::Schema;

/// Runs the migrations registered on a [`Schema`]
#[derive(Debug, Clone)]
pub struct Migrator {
    schema: Schema,
    repository: MigrationRepository,
}

impl Migrator {
    /// Migrator whose ledger lives on the schema's connection
    pub fn new(schema: Schema) -> Self {
        let repository = MigrationRepository::new(schema.clone(), schema.migrations_config().table.clone());
        Self { schema, repository }
    }

    pub fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    /// Run every pending migration as one new batch
    pub async fn run(&self) -> SchemaResult<MigrationRunResult> {
        let start_time = Instant::now();

        if !self.repository.repository_exists().await? {
            self.repository.create_repository().await?;
        }

        let ran = self.repository.get_ran().await?;
        let pending: Vec<&Arc<dyn Migration>> = self
            .schema
            .migrations()
            .iter()
            .filter(|migration| !ran.iter().any(|name| name == migration.signature()))
            .collect();

        if pending.is_empty() {
            info!("Nothing to migrate");
            return Ok(MigrationRunResult {
                skipped_count: ran.len(),
                execution_time_ms: start_time.elapsed().as_millis(),
                ..Default::default()
            });
        }

        let batch = self.repository.get_next_batch_number().await?;
        let mut applied_migrations = Vec::new();

        for migration in pending {
            let signature = migration.signature();
            let schema = self.schema_for(migration.as_ref())?;

            if let Err(e) = migration.up(&schema).await {
                error!(migration = %signature, batch, error = %e, "Migration failed");
                return Err(e);
            }
            self.repository.log(signature, batch).await?;

            info!(migration = %signature, batch, "Migrated");
            applied_migrations.push(signature.to_string());
        }

        Ok(MigrationRunResult {
            applied_migrations,
            batch,
            skipped_count: ran.len(),
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Roll back the last `step` migrations, or every migration of `batch`,
    /// or the last batch when neither is given
    pub async fn rollback(&self, step: usize, batch: Option<i64>) -> SchemaResult<RollbackResult> {
        let start_time = Instant::now();

        if !self.repository.repository_exists().await? {
            warn!(table = %self.repository.table(), "Migration table not found");
            return Ok(RollbackResult::default());
        }

        let records = if step > 0 {
            self.repository.get_migrations_by_step(step).await?
        } else if let Some(batch) = batch {
            self.repository.get_migrations_by_batch(batch).await?
        } else {
            self.repository.get_last().await?
        };

        let mut result = self.rollback_records(&records).await?;
        result.execution_time_ms = start_time.elapsed().as_millis();
        Ok(result)
    }

    /// Roll back every migration that has run, most recent first
    pub async fn reset(&self) -> SchemaResult<RollbackResult> {
        let start_time = Instant::now();

        if !self.repository.repository_exists().await? {
            warn!(table = %self.repository.table(), "Migration table not found");
            return Ok(RollbackResult::default());
        }

        let records = self.repository.get_migrations().await?;
        let mut result = self.rollback_records(&records).await?;
        result.execution_time_ms = start_time.elapsed().as_millis();
        Ok(result)
    }

    /// Ran/pending state of every registered migration, in registration order
    pub async fn status(&self) -> SchemaResult<Vec<MigrationStatus>> {
        let records = if self.repository.repository_exists().await? {
            self.repository.get_migrations().await?
        } else {
            Vec::new()
        };
        let batches: HashMap<&str, i64> = records
            .iter()
            .map(|record| (record.migration.as_str(), record.batch))
            .collect();

        Ok(self
            .schema
            .migrations()
            .iter()
            .map(|migration| {
                let batch = batches.get(migration.signature()).copied();
                MigrationStatus {
                    name: migration.signature().to_string(),
                    batch,
                    ran: batch.is_some(),
                }
            })
            .collect())
    }

    /// Drop every view, table and type on the connection, then run everything
    pub async fn fresh(&self) -> SchemaResult<MigrationRunResult> {
        info!(connection = %self.schema.connection_name(), "Dropping all tables");
        self.schema.drop_all_views().await?;
        self.schema.drop_all_tables().await?;
        self.schema.drop_all_types().await?;
        self.run().await
    }

    async fn rollback_records(&self, records: &[MigrationRecord]) -> SchemaResult<RollbackResult> {
        let mut result = RollbackResult::default();
        if records.is_empty() {
            info!("Nothing to rollback");
            return Ok(result);
        }

        for record in records {
            let Some(migration) = self.find(&record.migration) else {
                warn!(migration = %record.migration, "Migration not found");
                result.missing_migrations.push(record.migration.clone());
                continue;
            };
            let schema = self.schema_for(migration.as_ref())?;

            // Ledger row stays when down fails
            if let Err(e) = migration.down(&schema).await {
                error!(migration = %record.migration, batch = record.batch, error = %e, "Rollback failed");
                return Err(e);
            }
            self.repository.delete(&record.migration).await?;

            info!(migration = %record.migration, batch = record.batch, "Rolled back");
            result.rolled_back_migrations.push(record.migration.clone());
        }

        Ok(result)
    }

    fn find(&self, signature: &str) -> Option<&Arc<dyn Migration>> {
        self.schema
            .migrations()
            .iter()
            .find(|migration| migration.signature() == signature)
    }

    fn schema_for(&self, migration: &dyn Migration) -> SchemaResult<Schema> {
        match migration.connection() {
            Some(connection) => self.schema.connection(connection),
            None => Ok(self.schema.clone()),
        }
    }
}
