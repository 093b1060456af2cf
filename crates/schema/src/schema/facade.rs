//! Schema - the façade migrations and applications talk to
//!
//! Holds one [`Driver`] per configured connection. Definition calls build a
//! [`Blueprint`] from the caller's closure, compile it with the connection's
//! grammar and execute the statements in order. Introspection calls run the
//! grammar's catalog queries and normalize the rows through the processor.
//!
//! Multi-statement operations are not wrapped in a transaction; several
//! dialects cannot roll back DDL. A failure part way through returns the
//! error and leaves the earlier statements applied.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::blueprint::Blueprint;
use super::driver::Driver;
use super::grammars::Grammar;
use super::processors::{DBColumn, DBForeignKey, DBIndex, DBType};
use super::rust_types::{Extension, RustTypeMapper};
use super::types::{Column, ForeignKey, Index, Table, Type, View};
use crate::backends::{self, Dialect, Executor};
use crate::config::{ConnectionConfig, DatabaseConfig, MigrationsConfig};
use crate::error::{SchemaError, SchemaResult};
use crate::migrations::Migration;

/// Schema façade bound to one connection
#[derive(Clone)]
pub struct Schema {
    config: Arc<DatabaseConfig>,
    drivers: Arc<HashMap<String, Arc<Driver>>>,
    driver: Arc<Driver>,
    rust_types: RustTypeMapper,
    migrations: Vec<Arc<dyn Migration>>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("connection", &self.driver.name())
            .field("connections", &self.drivers.keys().collect::<Vec<_>>())
            .field("migrations", &self.migrations.len())
            .finish()
    }
}

impl Schema {
    pub fn builder(config: DatabaseConfig) -> SchemaBuilder {
        SchemaBuilder::new(config)
    }

    /// Connect every configured connection with the built-in sqlx executors
    pub async fn connect(config: DatabaseConfig) -> SchemaResult<Self> {
        SchemaBuilder::new(config).build().await
    }

    /// Single-connection schema over an existing executor
    pub fn with_executor(connection: ConnectionConfig, executor: Arc<dyn Executor>) -> SchemaResult<Self> {
        let config = DatabaseConfig::single(connection);
        let name = config.default.clone();
        let driver = Arc::new(Driver::new(name.clone(), config.connection(&name)?.clone(), executor)?);

        let mut drivers = HashMap::new();
        drivers.insert(name, Arc::clone(&driver));

        Ok(Self {
            config: Arc::new(config),
            drivers: Arc::new(drivers),
            driver,
            rust_types: RustTypeMapper::new(),
            migrations: Vec::new(),
        })
    }

    /// The same façade bound to another named connection
    pub fn connection(&self, name: &str) -> SchemaResult<Self> {
        let driver = self
            .drivers
            .get(name)
            .ok_or_else(|| SchemaError::configuration(format!("connection '{}' is not configured", name)))?;

        Ok(Self {
            driver: Arc::clone(driver),
            ..self.clone()
        })
    }

    pub fn connection_name(&self) -> &str {
        self.driver.name()
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn grammar(&self) -> &dyn Grammar {
        self.driver.grammar()
    }

    pub fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn migrations_config(&self) -> &MigrationsConfig {
        &self.config.migrations
    }

    // Definition

    /// Create a table
    pub async fn create<F>(&self, table: &str, callback: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = self.blueprint(table)?;
        blueprint.create();
        callback(&mut blueprint);
        self.build(blueprint).await
    }

    /// Alter a table
    pub async fn table<F>(&self, table: &str, callback: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = self.blueprint(table)?;
        callback(&mut blueprint);
        self.build(blueprint).await
    }

    /// Drop a table; errors when it does not exist
    pub async fn drop(&self, table: &str) -> SchemaResult<()> {
        let mut blueprint = self.blueprint(table)?;
        blueprint.drop();
        self.build(blueprint).await
    }

    pub async fn drop_if_exists(&self, table: &str) -> SchemaResult<()> {
        let mut blueprint = self.blueprint(table)?;
        blueprint.drop_if_exists();
        self.build(blueprint).await
    }

    pub async fn rename(&self, from: &str, to: &str) -> SchemaResult<()> {
        let mut blueprint = self.blueprint(from)?;
        blueprint.rename(to);
        self.build(blueprint).await
    }

    pub async fn drop_all_tables(&self) -> SchemaResult<()> {
        let tables = self.get_tables().await?;
        let names: Vec<String> = tables.iter().map(|table| self.droppable_name(&table.schema, &table.name)).collect();
        if names.is_empty() {
            return Ok(());
        }
        self.driver.execute_all(&self.grammar().compile_drop_all_tables(&names)).await
    }

    pub async fn drop_all_views(&self) -> SchemaResult<()> {
        let views = self.get_views().await?;
        let names: Vec<String> = views.iter().map(|view| self.droppable_name(&view.schema, &view.name)).collect();
        if names.is_empty() {
            return Ok(());
        }
        self.driver.execute_all(&self.grammar().compile_drop_all_views(&names)).await
    }

    /// Drop user-defined types and domains; a no-op outside PostgreSQL
    pub async fn drop_all_types(&self) -> SchemaResult<()> {
        let mut types = Vec::new();
        let mut domains = Vec::new();
        for ty in self.get_types().await?.into_iter().filter(|ty| !ty.implicit) {
            let name = self.droppable_name(&ty.schema, &ty.name);
            if ty.kind == "domain" {
                domains.push(name);
            } else {
                types.push(name);
            }
        }

        if !types.is_empty() {
            self.driver.execute_all(&self.grammar().compile_drop_all_types(&types)).await?;
        }
        if !domains.is_empty() {
            self.driver.execute_all(&self.grammar().compile_drop_all_domains(&domains)).await?;
        }
        Ok(())
    }

    /// Run raw SQL on this connection
    ///
    /// Placeholders follow the crate convention: `?` binds, `??` is a literal `?`.
    pub async fn sql(&self, sql: &str) -> SchemaResult<u64> {
        self.driver.execute(sql, &[]).await
    }

    // Introspection

    pub async fn has_table(&self, table: &str) -> SchemaResult<bool> {
        let (schema, table) = self.split_table(table)?;
        Ok(self
            .get_tables()
            .await?
            .iter()
            .any(|candidate| candidate.name.eq_ignore_ascii_case(&table) && candidate.schema == schema))
    }

    pub async fn has_view(&self, view: &str) -> SchemaResult<bool> {
        let (schema, view) = self.split_table(view)?;
        Ok(self
            .get_views()
            .await?
            .iter()
            .any(|candidate| candidate.name.eq_ignore_ascii_case(&view) && candidate.schema == schema))
    }

    pub async fn has_type(&self, name: &str) -> SchemaResult<bool> {
        Ok(self.get_types().await?.iter().any(|ty| ty.name.eq_ignore_ascii_case(name)))
    }

    pub async fn has_column(&self, table: &str, column: &str) -> SchemaResult<bool> {
        self.has_columns(table, &[column]).await
    }

    /// Whether every named column exists, ignoring case
    pub async fn has_columns(&self, table: &str, columns: &[&str]) -> SchemaResult<bool> {
        let listing: Vec<String> = self
            .get_column_listing(table)
            .await?
            .into_iter()
            .map(|column| column.to_lowercase())
            .collect();
        Ok(columns.iter().all(|column| listing.contains(&column.to_lowercase())))
    }

    /// Whether an index with this name exists on the table
    pub async fn has_index(&self, table: &str, index: &str) -> SchemaResult<bool> {
        let index = index.to_lowercase();
        Ok(self.get_indexes(table).await?.iter().any(|candidate| candidate.name == index))
    }

    /// Whether an index covers exactly these columns, in order
    pub async fn has_index_on(&self, table: &str, columns: &[&str]) -> SchemaResult<bool> {
        Ok(self.get_indexes(table).await?.iter().any(|index| {
            index.columns.len() == columns.len()
                && index
                    .columns
                    .iter()
                    .zip(columns)
                    .all(|(existing, wanted)| existing.eq_ignore_ascii_case(wanted))
        }))
    }

    pub async fn get_tables(&self) -> SchemaResult<Vec<Table>> {
        let sql = self.grammar().compile_tables(&self.driver.config().database_name());
        let rows = self.driver.select(&sql, &[]).await?;
        self.driver.processor().process_tables(&rows)
    }

    pub async fn get_table_listing(&self) -> SchemaResult<Vec<String>> {
        Ok(self.get_tables().await?.into_iter().map(|table| table.name).collect())
    }

    pub async fn get_views(&self) -> SchemaResult<Vec<View>> {
        let sql = self.grammar().compile_views(&self.driver.config().database_name());
        let rows = self.driver.select(&sql, &[]).await?;
        self.driver.processor().process_views(&rows)
    }

    pub async fn get_view_listing(&self) -> SchemaResult<Vec<String>> {
        Ok(self.get_views().await?.into_iter().map(|view| view.name).collect())
    }

    /// User-defined types; empty on dialects without them
    pub async fn get_types(&self) -> SchemaResult<Vec<Type>> {
        let Some(sql) = self.grammar().compile_types() else {
            return Ok(Vec::new());
        };
        let rows = self.driver.select(&sql, &[]).await?;
        let types = rows.iter().map(DBType::from_row).collect::<SchemaResult<Vec<_>>>()?;
        Ok(self.driver.processor().process_types(types))
    }

    pub async fn get_type_listing(&self) -> SchemaResult<Vec<String>> {
        Ok(self.get_types().await?.into_iter().map(|ty| ty.name).collect())
    }

    pub async fn get_columns(&self, table: &str) -> SchemaResult<Vec<Column>> {
        let (schema, table) = self.split_table(table)?;
        let sql = self.grammar().compile_columns(&schema, &table);
        let rows = self.driver.select(&sql, &[]).await?;
        let columns = rows.iter().map(DBColumn::from_row).collect::<SchemaResult<Vec<_>>>()?;
        Ok(self.driver.processor().process_columns(columns))
    }

    pub async fn get_column_listing(&self, table: &str) -> SchemaResult<Vec<String>> {
        Ok(self.get_columns(table).await?.into_iter().map(|column| column.name).collect())
    }

    pub async fn get_indexes(&self, table: &str) -> SchemaResult<Vec<Index>> {
        let (schema, table) = self.split_table(table)?;
        let sql = self.grammar().compile_indexes(&schema, &table);
        let rows = self.driver.select(&sql, &[]).await?;
        let indexes = rows.iter().map(DBIndex::from_row).collect::<SchemaResult<Vec<_>>>()?;
        Ok(self.driver.processor().process_indexes(indexes))
    }

    pub async fn get_index_listing(&self, table: &str) -> SchemaResult<Vec<String>> {
        Ok(self.get_indexes(table).await?.into_iter().map(|index| index.name).collect())
    }

    pub async fn get_foreign_keys(&self, table: &str) -> SchemaResult<Vec<ForeignKey>> {
        let (schema, table) = self.split_table(table)?;
        let sql = self.grammar().compile_foreign_keys(&schema, &table);
        let rows = self.driver.select(&sql, &[]).await?;
        let foreign_keys = rows.iter().map(DBForeignKey::from_row).collect::<SchemaResult<Vec<_>>>()?;
        Ok(self.driver.processor().process_foreign_keys(foreign_keys))
    }

    // Type mapping

    /// Register additional native type to Rust type mappings
    pub fn extend(&mut self, extension: Extension) -> SchemaResult<()> {
        self.rust_types.extend(extension)
    }

    pub fn rust_types(&self) -> &RustTypeMapper {
        &self.rust_types
    }

    /// Rust type for a live column
    pub fn rust_type(&self, column: &Column) -> String {
        self.rust_types.resolve(column)
    }

    // Migrations

    /// Register migrations in the order they should run
    pub fn register(&mut self, migrations: Vec<Arc<dyn Migration>>) {
        self.migrations.extend(migrations);
    }

    pub fn migrations(&self) -> &[Arc<dyn Migration>] {
        &self.migrations
    }

    fn blueprint(&self, table: &str) -> SchemaResult<Blueprint> {
        if table.contains('.') && self.dialect() == Dialect::Sqlite {
            return Err(SchemaError::unsupported(
                Dialect::Sqlite,
                format!("schema-qualified table '{}'", table),
            ));
        }
        Ok(Blueprint::new(table, self.driver.prefix()))
    }

    async fn build(&self, mut blueprint: Blueprint) -> SchemaResult<()> {
        let statements = blueprint.to_sql(self.grammar())?;
        debug!(
            connection = %self.driver.name(),
            table = %blueprint.qualified_table(),
            statements = statements.len(),
            "applying blueprint"
        );
        self.driver.execute_all(&statements).await
    }

    /// Resolve `[schema.]table` to the schema to search and the prefixed name
    fn split_table(&self, reference: &str) -> SchemaResult<(String, String)> {
        let config = self.driver.config();
        match reference.rsplit_once('.') {
            Some(_) if self.dialect() == Dialect::Sqlite => Err(SchemaError::unsupported(
                Dialect::Sqlite,
                format!("schema-qualified table '{}'", reference),
            )),
            Some((schema, table)) => Ok((schema.to_string(), format!("{}{}", config.prefix, table))),
            None => Ok((config.default_schema(), format!("{}{}", config.prefix, reference))),
        }
    }

    /// Name passed to the drop-all compilers; qualified where schemas are separate namespaces
    fn droppable_name(&self, schema: &str, name: &str) -> String {
        match self.dialect() {
            Dialect::Postgres | Dialect::SqlServer if !schema.is_empty() => format!("{}.{}", schema, name),
            _ => name.to_string(),
        }
    }
}

/// Builder assembling a [`Schema`] over several connections
///
/// Connections without a registered executor are opened with the built-in
/// sqlx executors when [`build`](SchemaBuilder::build) runs.
pub struct SchemaBuilder {
    config: DatabaseConfig,
    executors: HashMap<String, Arc<dyn Executor>>,
    extensions: Vec<Extension>,
    migrations: Vec<Arc<dyn Migration>>,
}

impl SchemaBuilder {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            executors: HashMap::new(),
            extensions: Vec::new(),
            migrations: Vec::new(),
        }
    }

    /// Use a caller-provided executor for a named connection
    pub fn executor(mut self, connection: impl Into<String>, executor: Arc<dyn Executor>) -> Self {
        self.executors.insert(connection.into(), executor);
        self
    }

    pub fn extend(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn migrations(mut self, migrations: Vec<Arc<dyn Migration>>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    pub async fn build(mut self) -> SchemaResult<Schema> {
        self.config.validate()?;

        if let Some(unknown) = self.executors.keys().find(|name| !self.config.connections.contains_key(*name)) {
            return Err(SchemaError::configuration(format!(
                "executor registered for unknown connection '{}'",
                unknown
            )));
        }

        let mut drivers = HashMap::new();
        for (name, connection) in &self.config.connections {
            let executor = match self.executors.remove(name) {
                Some(executor) => executor,
                None => backends::connect(connection).await?,
            };
            drivers.insert(name.clone(), Arc::new(Driver::new(name.clone(), connection.clone(), executor)?));
        }

        let driver = drivers
            .get(&self.config.default)
            .cloned()
            .ok_or_else(|| SchemaError::configuration(format!("connection '{}' is not configured", self.config.default)))?;

        let mut rust_types = RustTypeMapper::new();
        for extension in self.extensions {
            rust_types.extend(extension)?;
        }

        Ok(Schema {
            config: Arc::new(self.config),
            drivers: Arc::new(drivers),
            driver,
            rust_types,
            migrations: self.migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{DatabaseRow, DatabaseValue};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records statements and answers catalog queries with canned rows
    struct FakeExecutor {
        dialect: Dialect,
        statements: Mutex<Vec<String>>,
        rows: Vec<DatabaseRow>,
    }

    impl FakeExecutor {
        fn new(dialect: Dialect, rows: Vec<DatabaseRow>) -> Arc<Self> {
            Arc::new(Self {
                dialect,
                statements: Mutex::new(Vec::new()),
                rows,
            })
        }

        fn statements(&self) -> Vec<String> {
            self.statements.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn execute(&self, sql: &str, _params: &[DatabaseValue]) -> SchemaResult<u64> {
            if let Ok(mut statements) = self.statements.lock() {
                statements.push(sql.to_string());
            }
            Ok(0)
        }

        async fn fetch_all(&self, _sql: &str, _params: &[DatabaseValue]) -> SchemaResult<Vec<DatabaseRow>> {
            Ok(self.rows.clone())
        }

        fn dialect(&self) -> Dialect {
            self.dialect
        }
    }

    fn postgres_tables() -> Vec<DatabaseRow> {
        vec![
            DatabaseRow::new().with("name", "users").with("schema", "public"),
            DatabaseRow::new().with("name", "invoices").with("schema", "billing"),
        ]
    }

    #[tokio::test]
    async fn test_has_table_respects_schema() {
        let executor = FakeExecutor::new(Dialect::Postgres, postgres_tables());
        let schema = Schema::with_executor(
            ConnectionConfig::new(Dialect::Postgres, "postgres://localhost/app"),
            executor,
        )
        .unwrap();

        assert!(schema.has_table("users").await.unwrap());
        assert!(schema.has_table("public.users").await.unwrap());
        assert!(!schema.has_table("invoices").await.unwrap());
        assert!(schema.has_table("billing.invoices").await.unwrap());
    }

    #[tokio::test]
    async fn test_drop_all_tables_qualifies_postgres_names() {
        let executor = FakeExecutor::new(Dialect::Postgres, postgres_tables());
        let schema = Schema::with_executor(
            ConnectionConfig::new(Dialect::Postgres, "postgres://localhost/app"),
            executor.clone(),
        )
        .unwrap();

        schema.drop_all_tables().await.unwrap();
        assert_eq!(
            executor.statements(),
            vec!["drop table \"public\".\"users\",\"billing\".\"invoices\" cascade".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sqlite_rejects_schema_qualified_tables() {
        let executor = FakeExecutor::new(Dialect::Sqlite, Vec::new());
        let schema = Schema::with_executor(ConnectionConfig::new(Dialect::Sqlite, "sqlite::memory:"), executor).unwrap();

        let result = schema.create("crm.users", |table| {
            table.id();
        });
        assert!(matches!(result.await, Err(SchemaError::Unsupported { .. })));
        assert!(matches!(schema.get_columns("crm.users").await, Err(SchemaError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_create_applies_prefix() {
        let executor = FakeExecutor::new(Dialect::Sqlite, Vec::new());
        let schema = Schema::with_executor(
            ConnectionConfig::new(Dialect::Sqlite, "sqlite::memory:").with_prefix("app_"),
            executor.clone(),
        )
        .unwrap();

        schema
            .create("users", |table| {
                table.id();
                table.string("name", None);
            })
            .await
            .unwrap();

        let statements = executor.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("create table \"app_users\""));
    }

    #[tokio::test]
    async fn test_builder_with_named_connections() {
        let mut config = DatabaseConfig::single(ConnectionConfig::new(Dialect::Sqlite, "sqlite::memory:"));
        config.connections.insert(
            "reporting".to_string(),
            ConnectionConfig::new(Dialect::Postgres, "postgres://localhost/reports"),
        );

        let schema = Schema::builder(config)
            .executor("default", FakeExecutor::new(Dialect::Sqlite, Vec::new()))
            .executor("reporting", FakeExecutor::new(Dialect::Postgres, Vec::new()))
            .build()
            .await
            .unwrap();

        assert_eq!(schema.connection_name(), "default");
        assert_eq!(schema.dialect(), Dialect::Sqlite);

        let reporting = schema.connection("reporting").unwrap();
        assert_eq!(reporting.dialect(), Dialect::Postgres);
        assert!(schema.connection("missing").is_err());
    }

    #[tokio::test]
    async fn test_types_empty_outside_postgres() {
        let executor = FakeExecutor::new(Dialect::MySql, vec![DatabaseRow::new().with("name", "ignored")]);
        let schema = Schema::with_executor(ConnectionConfig::new(Dialect::MySql, "mysql://localhost/app"), executor).unwrap();
        assert!(schema.get_types().await.unwrap().is_empty());
        schema.drop_all_types().await.unwrap();
    }
}
