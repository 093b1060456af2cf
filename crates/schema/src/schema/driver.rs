//! Driver - one named connection's grammar, processor and executor

use std::sync::Arc;
use tracing::debug;

use super::grammars::{grammar_for, Grammar};
use super::processors::{processor_for, Processor};
use crate::backends::{DatabaseRow, DatabaseValue, Dialect, Executor};
use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};

/// Everything needed to compile and run schema statements on one connection
pub struct Driver {
    name: String,
    config: ConnectionConfig,
    grammar: Box<dyn Grammar>,
    processor: Box<dyn Processor>,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("dialect", &self.config.driver)
            .field("prefix", &self.config.prefix)
            .finish()
    }
}

impl Driver {
    /// Bind an executor to a connection config
    ///
    /// Fails when the executor speaks a different dialect than configured.
    pub fn new(name: impl Into<String>, config: ConnectionConfig, executor: Arc<dyn Executor>) -> SchemaResult<Self> {
        let name = name.into();
        if executor.dialect() != config.driver {
            return Err(SchemaError::configuration(format!(
                "connection '{}' is configured for {} but its executor speaks {}",
                name,
                config.driver,
                executor.dialect()
            )));
        }

        Ok(Self {
            grammar: grammar_for(&config),
            processor: processor_for(config.driver),
            name,
            config,
            executor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.config.driver
    }

    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    pub fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    pub fn executor(&self) -> Arc<dyn Executor> {
        Arc::clone(&self.executor)
    }

    /// Execute one statement; `?` placeholders are rewritten for the dialect
    pub async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<u64> {
        let sql = self.grammar.prepare_placeholders(sql);
        debug!(connection = %self.name, sql = %sql, "executing statement");
        self.executor.execute(&sql, params).await
    }

    /// Run a query and return its rows
    pub async fn select(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<Vec<DatabaseRow>> {
        let sql = self.grammar.prepare_placeholders(sql);
        debug!(connection = %self.name, sql = %sql, "running query");
        self.executor.fetch_all(&sql, params).await
    }

    /// Execute compiled statements in order
    ///
    /// Not atomic: a failure leaves earlier statements applied.
    pub async fn execute_all(&self, statements: &[String]) -> SchemaResult<()> {
        for statement in statements {
            self.execute(statement, &[]).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingExecutor {
        dialect: Dialect,
        statements: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Executor for RecordingExecutor {
        async fn execute(&self, sql: &str, _params: &[DatabaseValue]) -> SchemaResult<u64> {
            if sql.contains("fail") {
                return Err(SchemaError::execution(sql, "boom"));
            }
            if let Ok(mut statements) = self.statements.lock() {
                statements.push(sql.to_string());
            }
            Ok(0)
        }

        async fn fetch_all(&self, _sql: &str, _params: &[DatabaseValue]) -> SchemaResult<Vec<DatabaseRow>> {
            Ok(Vec::new())
        }

        fn dialect(&self) -> Dialect {
            self.dialect
        }
    }

    fn executor(dialect: Dialect) -> Arc<RecordingExecutor> {
        Arc::new(RecordingExecutor {
            dialect,
            statements: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_dialect_mismatch_rejected() {
        let config = ConnectionConfig::new(Dialect::Postgres, "postgres://localhost/app");
        let result = Driver::new("pg", config, executor(Dialect::Sqlite));
        assert!(matches!(result, Err(SchemaError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_placeholders_rewritten_and_sequence_not_atomic() {
        let recorder = executor(Dialect::Postgres);
        let config = ConnectionConfig::new(Dialect::Postgres, "postgres://localhost/app");
        let driver = Driver::new("pg", config, recorder.clone()).unwrap();

        driver
            .execute("insert into \"t\" (\"a\", \"b\") values (?, ?)", &[1.into(), 2.into()])
            .await
            .unwrap();

        let statements = vec!["create table a".to_string(), "fail here".to_string(), "create table b".to_string()];
        assert!(driver.execute_all(&statements).await.is_err());

        let recorded = recorder.statements.lock().unwrap().clone();
        assert_eq!(
            recorded,
            vec![
                "insert into \"t\" (\"a\", \"b\") values ($1, $2)".to_string(),
                "create table a".to_string(),
            ]
        );
    }
}
