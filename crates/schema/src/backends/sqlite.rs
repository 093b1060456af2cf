//! SQLite Executor Implementation
//!
//! sqlx-backed [`Executor`] for SQLite files and in-memory databases.

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::Executor as SqlxExecutor;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite, ValueRef};
use std::str::FromStr;

use super::core::*;
use super::Dialect;
use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};

/// SQLite executor backed by an sqlx pool
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: Pool<Sqlite>,
}

impl SqliteExecutor {
    /// Connect using a connection config
    ///
    /// In-memory databases live as long as their connection, so the pool is
    /// pinned to a single connection that never idles out.
    pub async fn connect(config: &ConnectionConfig) -> SchemaResult<Self> {
        Self::connect_url(&config.url, config.max_connections).await
    }

    /// Open a private in-memory database
    pub async fn memory() -> SchemaResult<Self> {
        Self::connect_url("sqlite::memory:", 1).await
    }

    async fn connect_url(url: &str, max_connections: u32) -> SchemaResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchemaError::configuration(format!("Invalid SQLite url '{}': {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| SchemaError::Connection(format!("Failed to create SQLite pool: {}", e)))?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<u64> {
        // Unprepared when there is nothing to bind, so scripts run on one connection
        let result = if params.is_empty() {
            SqlxExecutor::execute(&self.pool, sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_database_value(query, param);
            }
            query.execute(&self.pool).await
        };

        let result = result.map_err(|e| SchemaError::execution(sql, e))?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> SchemaResult<Vec<DatabaseRow>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SchemaError::execution(sql, e))?;

        rows.iter().map(sqlite_row_to_database_row).collect()
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}

fn bind_database_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &DatabaseValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int(i) => query.bind(*i),
        DatabaseValue::Float(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Json(j) => query.bind(j.to_string()),
    }
}

fn sqlite_row_to_database_row(row: &SqliteRow) -> SchemaResult<DatabaseRow> {
    let mut result = DatabaseRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        result.push(column.name(), sqlite_value_to_database_value(row, index)?);
    }
    Ok(result)
}

/// Convert a SQLite value to DatabaseValue
///
/// SQLite reports the storage class of each value, so decoding follows the
/// value rather than the declared column type.
fn sqlite_value_to_database_value(row: &SqliteRow, index: usize) -> SchemaResult<DatabaseValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| SchemaError::decode(format!("Failed to read column {}: {}", index, e)))?;
    if raw.is_null() {
        return Ok(DatabaseValue::Null);
    }

    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Ok(DatabaseValue::Int(value));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(DatabaseValue::Float(value));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(DatabaseValue::String(value));
    }

    row.try_get::<Vec<u8>, _>(index)
        .map(DatabaseValue::Bytes)
        .map_err(|e| SchemaError::decode(format!("Failed to decode SQLite value at {}: {}", index, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_executor_round_trip() {
        let executor = SqliteExecutor::memory().await.unwrap();
        executor
            .execute("create table \"notes\" (\"id\" integer, \"body\" varchar, \"score\" float)", &[])
            .await
            .unwrap();
        let affected = executor
            .execute(
                "insert into \"notes\" values (?, ?, ?)",
                &[1i64.into(), "hello".into(), 2.5f64.into()],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = executor
            .fetch_all("select * from \"notes\"", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("id"), Some(1));
        assert_eq!(rows[0].get_string("body").unwrap(), "hello");
        assert_eq!(rows[0].get("score"), Some(&DatabaseValue::Float(2.5)));
    }

    #[tokio::test]
    async fn test_execution_error_carries_sql() {
        let executor = SqliteExecutor::memory().await.unwrap();
        let err = executor
            .execute("drop table \"missing\"", &[])
            .await
            .unwrap_err();
        assert!(err.is_execution());
        assert!(err.to_string().contains("drop table \"missing\""));
    }
}
