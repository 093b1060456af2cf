//! Error types for the schema system
//!
//! Covers caller mistakes (features a dialect cannot express),
//! SQL compilation failures, driver execution failures and migration
//! ledger problems.

use thiserror::Error;

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error types for schema and migration operations
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A feature was requested on a dialect that cannot express it
    #[error("Unsupported by {dialect}: {message}")]
    Unsupported { dialect: String, message: String },

    /// A value could not be rendered into SQL
    #[error("Compilation error: {0}")]
    Compilation(String),

    /// The underlying driver rejected a statement
    #[error("Execution error: {message} (sql: {sql})")]
    Execution { sql: String, message: String },

    /// Connection could not be established or was not configured
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An introspection row could not be normalized
    #[error("Decode error: {0}")]
    Decode(String),

    /// Migration ledger or lifecycle error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create an unsupported-feature error for a dialect
    pub fn unsupported(dialect: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect: dialect.to_string(),
            message: message.into(),
        }
    }

    /// Create a compilation error
    pub fn compilation(message: impl Into<String>) -> Self {
        Self::Compilation(message.into())
    }

    /// Create an execution error carrying the failed statement
    pub fn execution(sql: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Execution {
            sql: sql.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Whether this error came from the driver rather than from this crate
    pub fn is_execution(&self) -> bool {
        matches!(self, SchemaError::Execution { .. })
    }
}

impl From<sqlx::Error> for SchemaError {
    fn from(err: sqlx::Error) -> Self {
        SchemaError::Connection(err.to_string())
    }
}

impl From<regex::Error> for SchemaError {
    fn from(err: regex::Error) -> Self {
        SchemaError::Configuration(format!("invalid type pattern: {}", err))
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        SchemaError::Configuration(err.to_string())
    }
}

impl From<url::ParseError> for SchemaError {
    fn from(err: url::ParseError) -> Self {
        SchemaError::Configuration(format!("invalid database url: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SchemaError::unsupported("sqlite", "dropping foreign keys");
        assert_eq!(err.to_string(), "Unsupported by sqlite: dropping foreign keys");

        let err = SchemaError::execution("drop table \"users\"", "no such table: users");
        assert!(err.is_execution());
        assert!(err.to_string().contains("drop table \"users\""));
    }
}
