//! PostgreSQL Executor Implementation
//!
//! This module provides the PostgreSQL implementation of the [`Executor`]
//! trait using sqlx as the underlying database driver.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::Executor as SqlxExecutor;
use sqlx::{Column, Pool, Postgres, Row, TypeInfo, ValueRef};
use std::time::Duration;

use super::core::*;
use super::Dialect;
use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};

/// PostgreSQL executor backed by an sqlx pool
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    pool: Pool<Postgres>,
}

impl PostgresExecutor {
    /// Connect using a connection config
    pub async fn connect(config: &ConnectionConfig) -> SchemaResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await
            .map_err(|e| SchemaError::Connection(format!("Failed to create PostgreSQL pool: {}", e)))?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl Executor for PostgresExecutor {
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

        rows.iter().map(postgres_row_to_database_row).collect()
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &DatabaseValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int(i) => query.bind(*i),
        DatabaseValue::Float(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn postgres_row_to_database_row(row: &PgRow) -> SchemaResult<DatabaseRow> {
    let mut result = DatabaseRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        result.push(column.name(), postgres_value_to_database_value(row, index)?);
    }
    Ok(result)
}

/// Convert a PostgreSQL column value to DatabaseValue
fn postgres_value_to_database_value(row: &PgRow, index: usize) -> SchemaResult<DatabaseValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| SchemaError::decode(format!("Failed to read column {}: {}", index, e)))?;
    if raw.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let type_name = row.columns()[index].type_info().name().to_string();
    let decode_err = |e: sqlx::Error| {
        SchemaError::decode(format!("Failed to decode {} value: {}", type_name, e))
    };

    let value = match type_name.as_str() {
        "BOOL" => DatabaseValue::Bool(row.try_get::<bool, _>(index).map_err(decode_err)?),
        "INT2" => DatabaseValue::Int(i64::from(row.try_get::<i16, _>(index).map_err(decode_err)?)),
        "INT4" => DatabaseValue::Int(i64::from(row.try_get::<i32, _>(index).map_err(decode_err)?)),
        "INT8" => DatabaseValue::Int(row.try_get::<i64, _>(index).map_err(decode_err)?),
        "OID" => {
            let oid: sqlx::postgres::types::Oid = row.try_get(index).map_err(decode_err)?;
            DatabaseValue::Int(i64::from(oid.0))
        }
        "FLOAT4" => DatabaseValue::Float(f64::from(row.try_get::<f32, _>(index).map_err(decode_err)?)),
        "FLOAT8" => DatabaseValue::Float(row.try_get::<f64, _>(index).map_err(decode_err)?),
        "\"CHAR\"" | "CHAR" => {
            let code: i8 = row.try_get(index).map_err(decode_err)?;
            DatabaseValue::String(char::from(code as u8).to_string())
        }
        "BYTEA" => DatabaseValue::Bytes(row.try_get::<Vec<u8>, _>(index).map_err(decode_err)?),
        "UUID" => DatabaseValue::String(row.try_get::<uuid::Uuid, _>(index).map_err(decode_err)?.to_string()),
        "TIMESTAMPTZ" => {
            let value: chrono::DateTime<chrono::Utc> = row.try_get(index).map_err(decode_err)?;
            DatabaseValue::String(value.to_rfc3339())
        }
        "TIMESTAMP" => {
            let value: chrono::NaiveDateTime = row.try_get(index).map_err(decode_err)?;
            DatabaseValue::String(value.to_string())
        }
        "DATE" => DatabaseValue::String(row.try_get::<chrono::NaiveDate, _>(index).map_err(decode_err)?.to_string()),
        "TIME" => DatabaseValue::String(row.try_get::<chrono::NaiveTime, _>(index).map_err(decode_err)?.to_string()),
        "JSON" | "JSONB" => DatabaseValue::Json(row.try_get::<JsonValue, _>(index).map_err(decode_err)?),
        "NAME[]" | "TEXT[]" | "VARCHAR[]" => {
            let values: Vec<String> = row.try_get(index).map_err(decode_err)?;
            DatabaseValue::String(values.join(","))
        }
        // text, varchar, name, bpchar and anything else with a textual form
        _ => DatabaseValue::String(row.try_get::<String, _>(index).map_err(decode_err)?),
    };

    Ok(value)
}
