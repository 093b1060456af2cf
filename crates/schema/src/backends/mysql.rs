//! MySQL Executor Implementation
//!
//! sqlx-backed [`Executor`] for MySQL and MariaDB connections.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::Executor as SqlxExecutor;
use sqlx::{Column, MySql, Pool, Row, TypeInfo, ValueRef};
use std::time::Duration;

use super::core::*;
use super::Dialect;
use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};

/// MySQL executor backed by an sqlx pool
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: Pool<MySql>,
}

impl MySqlExecutor {
    /// Connect using a connection config
    pub async fn connect(config: &ConnectionConfig) -> SchemaResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await
            .map_err(|e| SchemaError::Connection(format!("Failed to create MySQL pool: {}", e)))?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<MySql> {
        &self.pool
    }
}

#[async_trait]
impl Executor for MySqlExecutor {
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

        rows.iter().map(mysql_row_to_database_row).collect()
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }
}

fn bind_database_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &DatabaseValue,
) -> Query<'q, MySql, MySqlArguments> {
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

fn mysql_row_to_database_row(row: &MySqlRow) -> SchemaResult<DatabaseRow> {
    let mut result = DatabaseRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        result.push(column.name(), mysql_value_to_database_value(row, index)?);
    }
    Ok(result)
}

/// Convert a MySQL column value to DatabaseValue
fn mysql_value_to_database_value(row: &MySqlRow, index: usize) -> SchemaResult<DatabaseValue> {
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

    if type_name.ends_with("UNSIGNED") {
        let value: u64 = row.try_get(index).map_err(decode_err)?;
        return Ok(DatabaseValue::Int(value as i64));
    }

    let value = match type_name.as_str() {
        "BOOLEAN" => DatabaseValue::Bool(row.try_get::<bool, _>(index).map_err(decode_err)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            DatabaseValue::Int(row.try_get::<i64, _>(index).map_err(decode_err)?)
        }
        "FLOAT" => DatabaseValue::Float(f64::from(row.try_get::<f32, _>(index).map_err(decode_err)?)),
        "DOUBLE" => DatabaseValue::Float(row.try_get::<f64, _>(index).map_err(decode_err)?),
        "JSON" => DatabaseValue::Json(row.try_get::<JsonValue, _>(index).map_err(decode_err)?),
        "DATETIME" | "TIMESTAMP" => {
            let value: chrono::NaiveDateTime = row.try_get(index).map_err(decode_err)?;
            DatabaseValue::String(value.to_string())
        }
        "DATE" => DatabaseValue::String(row.try_get::<chrono::NaiveDate, _>(index).map_err(decode_err)?.to_string()),
        "TIME" => DatabaseValue::String(row.try_get::<chrono::NaiveTime, _>(index).map_err(decode_err)?.to_string()),
        // information_schema exposes several text columns with a binary collation
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            let bytes: Vec<u8> = row.try_get(index).map_err(decode_err)?;
            match String::from_utf8(bytes) {
                Ok(text) => DatabaseValue::String(text),
                Err(e) => DatabaseValue::Bytes(e.into_bytes()),
            }
        }
        _ => match row.try_get::<String, _>(index) {
            Ok(text) => DatabaseValue::String(text),
            Err(_) => DatabaseValue::Bytes(row.try_get::<Vec<u8>, _>(index).map_err(decode_err)?),
        },
    };

    Ok(value)
}
