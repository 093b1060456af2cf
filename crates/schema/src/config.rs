//! Connection and migration configuration
//!
//! Configuration is read once when a [`Schema`](crate::Schema) is built.
//! It can come from YAML (`database.yaml`) or from environment variables.

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::backends::Dialect;
use crate::error::{SchemaError, SchemaResult};

/// Top-level database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Name of the connection used when none is requested explicitly
    pub default: String,
    /// Named connections
    pub connections: HashMap<String, ConnectionConfig>,
    /// Migration ledger settings
    #[serde(default)]
    pub migrations: MigrationsConfig,
}

/// One named database connection
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub driver: Dialect,
    pub url: String,
    /// Database name; derived from the url path when absent
    #[serde(default)]
    pub database: Option<String>,
    /// Default schema (Postgres / SQL Server)
    #[serde(default)]
    pub schema: Option<String>,
    /// Prefix prepended to every table name
    #[serde(default)]
    pub prefix: String,
    /// Singular table naming, read by model generators
    #[serde(default)]
    pub singular: bool,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    /// Pool size for the sqlx executors
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Migration ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationsConfig {
    /// Ledger table name
    #[serde(default = "default_migrations_table")]
    pub table: String,
    /// Directory where new migration stubs are written
    #[serde(default = "default_migrations_path")]
    pub path: PathBuf,
}

fn default_migrations_table() -> String {
    "migrations".to_string()
}

fn default_migrations_path() -> PathBuf {
    PathBuf::from("database/migrations")
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            table: default_migrations_table(),
            path: default_migrations_path(),
        }
    }
}

impl ConnectionConfig {
    /// Create a connection config with defaults for everything but driver and url
    pub fn new(driver: Dialect, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            database: None,
            schema: None,
            prefix: String::new(),
            singular: false,
            charset: None,
            collation: None,
            engine: None,
            max_connections: default_max_connections(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Database name, taken from the url path when not configured
    pub fn database_name(&self) -> String {
        if let Some(database) = &self.database {
            return database.clone();
        }

        if self.driver == Dialect::Sqlite {
            return "main".to_string();
        }

        url::Url::parse(&self.url)
            .ok()
            .map(|parsed| parsed.path().trim_start_matches('/').to_string())
            .unwrap_or_default()
    }

    /// Schema unqualified table names resolve to
    pub fn default_schema(&self) -> String {
        if let Some(schema) = &self.schema {
            return schema.clone();
        }

        match self.driver {
            Dialect::Postgres => "public".to_string(),
            Dialect::SqlServer => "dbo".to_string(),
            Dialect::MySql => self.database_name(),
            Dialect::Sqlite => "main".to_string(),
        }
    }

    /// Check the url scheme matches the driver
    pub fn validate(&self) -> SchemaResult<()> {
        if self.driver == Dialect::Sqlite {
            if !self.url.starts_with("sqlite:") {
                return Err(SchemaError::configuration(format!(
                    "sqlite connection url must start with 'sqlite:', got '{}'",
                    self.url
                )));
            }
            return Ok(());
        }

        let parsed = url::Url::parse(&self.url)?;
        let expected: &[&str] = match self.driver {
            Dialect::Postgres => &["postgres", "postgresql"],
            Dialect::MySql => &["mysql", "mariadb"],
            Dialect::SqlServer => &["mssql", "sqlserver"],
            Dialect::Sqlite => &["sqlite"],
        };
        if !expected.contains(&parsed.scheme()) {
            return Err(SchemaError::configuration(format!(
                "url scheme '{}' does not match driver {}",
                parsed.scheme(),
                self.driver
            )));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Build a config with a single connection named `default`
    pub fn single(connection: ConnectionConfig) -> Self {
        let mut connections = HashMap::new();
        connections.insert("default".to_string(), connection);
        Self {
            default: "default".to_string(),
            connections,
            migrations: MigrationsConfig::default(),
        }
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(source: &str) -> SchemaResult<Self> {
        let config: DatabaseConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Load configuration from environment variables
    ///
    /// `DATABASE_URL` is required; the driver is taken from `DB_CONNECTION`
    /// or inferred from the url scheme.
    pub fn from_env() -> SchemaResult<Self> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| SchemaError::configuration("DATABASE_URL is not set"))?;

        let driver = match env::var("DB_CONNECTION") {
            Ok(driver) => driver.parse()?,
            Err(_) => Dialect::from_url(&url)?,
        };

        let mut connection = ConnectionConfig::new(driver, url);
        if let Ok(prefix) = env::var("DB_PREFIX") {
            connection.prefix = prefix;
        }
        if let Ok(schema) = env::var("DB_SCHEMA") {
            connection.schema = Some(schema);
        }
        if let Ok(database) = env::var("DB_DATABASE") {
            connection.database = Some(database);
        }

        let mut config = Self::single(connection);
        config.default = driver.to_string();
        if let Some(connection) = config.connections.remove("default") {
            config.connections.insert(driver.to_string(), connection);
        }
        if let Ok(table) = env::var("DB_MIGRATIONS_TABLE") {
            config.migrations.table = table;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SchemaResult<()> {
        if !self.connections.contains_key(&self.default) {
            return Err(SchemaError::configuration(format!(
                "default connection '{}' is not configured",
                self.default
            )));
        }
        if self.migrations.table.trim().is_empty() {
            return Err(SchemaError::configuration("migrations table name cannot be empty"));
        }
        for connection in self.connections.values() {
            connection.validate()?;
        }
        Ok(())
    }

    /// Look up a connection by name
    pub fn connection(&self, name: &str) -> SchemaResult<&ConnectionConfig> {
        self.connections
            .get(name)
            .ok_or_else(|| SchemaError::configuration(format!("connection '{}' is not configured", name)))
    }
}
