//! Database Backend Abstractions
//!
//! The schema engine never talks to a driver directly. It goes through the
//! [`Executor`] trait so each named connection can be backed by sqlx, a test
//! double, or any caller-provided driver (SQL Server).

pub mod core;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use core::*;
pub use mysql::MySqlExecutor;
pub use postgres::PostgresExecutor;
pub use sqlite::SqliteExecutor;

use serde::Deserialize;
use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
    SqlServer,
}

impl Dialect {
    /// Detect the dialect from a connection url scheme
    pub fn from_url(url: &str) -> SchemaResult<Self> {
        if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            Ok(Dialect::Postgres)
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(Dialect::MySql)
        } else if url.starts_with("sqlite:") {
            Ok(Dialect::Sqlite)
        } else if url.starts_with("mssql://") || url.starts_with("sqlserver://") {
            Ok(Dialect::SqlServer)
        } else {
            Err(SchemaError::configuration(format!(
                "unable to detect database dialect from url: {}",
                url
            )))
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::SqlServer => write!(f, "sqlserver"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pgsql" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            _ => Err(SchemaError::configuration(format!(
                "unsupported database driver: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Open an sqlx-backed executor for a connection
///
/// SQL Server has no sqlx driver; callers register their own executor for it
/// through [`SchemaBuilder::executor`](crate::SchemaBuilder::executor).
pub async fn connect(config: &ConnectionConfig) -> SchemaResult<Arc<dyn Executor>> {
    match config.driver {
        Dialect::Postgres => Ok(Arc::new(PostgresExecutor::connect(config).await?)),
        Dialect::MySql => Ok(Arc::new(MySqlExecutor::connect(config).await?)),
        Dialect::Sqlite => Ok(Arc::new(SqliteExecutor::connect(config).await?)),
        Dialect::SqlServer => Err(SchemaError::Connection(
            "no built-in sqlserver executor; register one with SchemaBuilder::executor".to_string(),
        )),
    }
}
