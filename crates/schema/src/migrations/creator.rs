//! Migration Creator - writes new migration stubs
//!
//! Files are named `{YYYY_MM_DD_HHMMSS}_{name}.rs` so a directory listing
//! sorts them in creation order. The stub picked depends on whether the
//! migration creates a table, alters one, or neither.

use chrono::Utc;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{SchemaError, SchemaResult};

const CREATE_STUB: &str = r#"use elif_schema::{Migration, Schema, SchemaResult};

pub struct {{ struct }};

#[async_trait::async_trait]
impl Migration for {{ struct }} {
    fn signature(&self) -> &str {
        "{{ signature }}"
    }

    async fn up(&self, schema: &Schema) -> SchemaResult<()> {
        schema
            .create("{{ table }}", |table| {
                table.id();
                table.timestamps(None);
            })
            .await
    }

    async fn down(&self, schema: &Schema) -> SchemaResult<()> {
        schema.drop_if_exists("{{ table }}").await
    }
}
"#;

const UPDATE_STUB: &str = r#"use elif_schema::{Migration, Schema, SchemaResult};

pub struct {{ struct }};

#[async_trait::async_trait]
impl Migration for {{ struct }} {
    fn signature(&self) -> &str {
        "{{ signature }}"
    }

    async fn up(&self, schema: &Schema) -> SchemaResult<()> {
        schema.table("{{ table }}", |_table| {}).await
    }

    async fn down(&self, schema: &Schema) -> SchemaResult<()> {
        schema.table("{{ table }}", |_table| {}).await
    }
}
"#;

const BLANK_STUB: &str = r#"use elif_schema::{Migration, Schema, SchemaResult};

pub struct {{ struct }};

#[async_trait::async_trait]
impl Migration for {{ struct }} {
    fn signature(&self) -> &str {
        "{{ signature }}"
    }

    async fn up(&self, _schema: &Schema) -> SchemaResult<()> {
        Ok(())
    }

    async fn down(&self, _schema: &Schema) -> SchemaResult<()> {
        Ok(())
    }
}
"#;

/// Writes migration stubs into a directory
#[derive(Debug, Clone)]
pub struct MigrationCreator {
    path: PathBuf,
}

impl MigrationCreator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a stub for `name`, returning the written file
    ///
    /// With no explicit table, `create_users_table` and
    /// `add_email_to_users_table` style names pick the table and stub.
    pub fn create(&self, name: &str, table: Option<&str>, create: bool) -> SchemaResult<PathBuf> {
        let name = snake_case(name);
        if name.is_empty() {
            return Err(SchemaError::migration("migration name cannot be empty"));
        }
        self.ensure_migration_doesnt_exist(&name)?;

        let (table, create) = match table {
            Some(table) => (Some(table.to_string()), create),
            None => match guess_table(&name)? {
                Some((table, guessed_create)) => (Some(table), create || guessed_create),
                None => (None, create),
            },
        };

        let signature = format!("{}_{}", Utc::now().format("%Y_%m_%d_%H%M%S"), name);
        let stub = match (&table, create) {
            (Some(_), true) => CREATE_STUB,
            (Some(_), false) => UPDATE_STUB,
            (None, _) => BLANK_STUB,
        };
        let contents = stub
            .replace("{{ struct }}", &pascal_case(&name))
            .replace("{{ signature }}", &signature)
            .replace("{{ table }}", table.as_deref().unwrap_or_default());

        fs::create_dir_all(&self.path)?;
        let file = self.path.join(format!("{}.rs", signature));
        fs::write(&file, contents)?;

        info!(file = %file.display(), "Created migration");
        Ok(file)
    }

    fn ensure_migration_doesnt_exist(&self, name: &str) -> SchemaResult<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let suffix = format!("_{}.rs", name);
        for entry in fs::read_dir(&self.path)? {
            let file_name = entry?.file_name();
            if file_name.to_string_lossy().ends_with(&suffix) {
                return Err(SchemaError::migration(format!("a {} migration already exists", name)));
            }
        }
        Ok(())
    }
}

/// Table and create flag implied by a migration name
fn guess_table(name: &str) -> SchemaResult<Option<(String, bool)>> {
    let create = Regex::new(r"^create_(\w+?)(?:_table)?$")?;
    if let Some(captures) = create.captures(name) {
        return Ok(Some((captures[1].to_string(), true)));
    }

    let change = Regex::new(r"_(?:to|from|in)_(\w+?)(?:_table)?$")?;
    if let Some(captures) = change.captures(name) {
        return Ok(Some((captures[1].to_string(), false)));
    }

    Ok(None)
}

fn snake_case(name: &str) -> String {
    let mut output = String::new();
    for (index, ch) in name.trim().chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 && !output.ends_with('_') {
                output.push('_');
            }
            output.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            output.push(ch);
        } else if !output.ends_with('_') && !output.is_empty() {
            output.push('_');
        }
    }
    output.trim_end_matches('_').to_string()
}

fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
