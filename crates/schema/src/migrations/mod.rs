//! Migration System
//!
//! Registered [`Migration`]s are applied in batches by the [`Migrator`],
//! which records what has run in a ledger table through the
//! [`MigrationRepository`]. [`MigrationCreator`] writes new stubs.

pub mod creator;
pub mod definitions;
pub mod migrator;
pub mod repository;

pub use creator::MigrationCreator;
pub use definitions::{
    split_sql_statements, Migration, MigrationRecord, MigrationRunResult, MigrationStatus, RollbackResult,
    SqlMigration,
};
pub use migrator::Migrator;
pub use repository::MigrationRepository;
