//! Grammars - per-dialect SQL compilers
//!
//! A grammar turns blueprint commands into literal SQL, maps semantic column
//! types to native syntax, builds catalog queries for introspection, renders
//! JSON path predicates and supplies the small query clauses that differ
//! between dialects. Grammars never touch the network.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;
pub use sqlserver::SqlServerGrammar;

use serde_json::Value as JsonValue;

use super::blueprint::Blueprint;
use super::column::{ColumnDefinition, ColumnType, DefaultValue};
use super::command::{Command, CommandKind};
use super::json::{CompiledSql, JsonPath};
use crate::backends::Dialect;
use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};

/// Bind parameter syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `@p1`, `@p2`, ...
    AtP,
}

/// Where a lock clause goes in a select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPosition {
    /// After the whole statement
    Suffix,
    /// Right after the table name
    TableHint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockClause {
    pub sql: String,
    pub position: LockPosition,
}

impl LockClause {
    pub fn suffix(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            position: LockPosition::Suffix,
        }
    }

    pub fn table_hint(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            position: LockPosition::TableHint,
        }
    }
}

/// Per-dialect SQL compiler
pub trait Grammar: Send + Sync {
    fn dialect(&self) -> Dialect;

    // Identifiers and literals

    /// Opening and closing identifier quotes
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quote one identifier segment
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let (open, close) = self.quote_chars();
        let escaped = value.replace(close, &format!("{}{}", close, close));
        format!("{}{}{}", open, escaped, close)
    }

    /// Quote a possibly dotted or aliased identifier
    fn wrap(&self, value: &str) -> String {
        let lower = value.to_ascii_lowercase();
        if let Some(position) = lower.find(" as ") {
            let (column, alias) = (&value[..position], &value[position + 4..]);
            return format!("{} as {}", self.wrap(column.trim()), self.wrap_value(alias.trim()));
        }
        value
            .split('.')
            .map(|segment| self.wrap_value(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote the blueprint's table, schema included
    fn wrap_table(&self, blueprint: &Blueprint) -> String {
        self.wrap(&blueprint.qualified_table())
    }

    /// Quote a table name given by the caller, applying the prefix
    fn wrap_table_name(&self, table: &str, prefix: &str) -> String {
        match table.rsplit_once('.') {
            Some((schema, table)) => format!("{}.{}", self.wrap(schema), self.wrap_value(&format!("{}{}", prefix, table))),
            None => self.wrap_value(&format!("{}{}", prefix, table)),
        }
    }

    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.wrap(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Quote a string literal
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn quote_strings(&self, values: &[String]) -> String {
        values
            .iter()
            .map(|value| self.quote_string(value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render a column default
    fn get_default_value(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Bool(b) => format!("'{}'", u8::from(*b)),
            DefaultValue::Int(i) => format!("'{}'", i),
            DefaultValue::Float(f) => format!("'{}'", f),
            DefaultValue::String(s) => self.quote_string(s),
            DefaultValue::Expression(sql) => sql.clone(),
        }
    }

    /// Name, type and modifiers of one column
    fn get_column(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String;

    fn get_columns(&self, blueprint: &Blueprint) -> Vec<String> {
        blueprint
            .get_added_columns()
            .into_iter()
            .map(|column| self.get_column(blueprint, column))
            .collect()
    }

    // Command dispatch

    /// Compile one blueprint command
    fn compile_command(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        match command.kind {
            CommandKind::Create => self.compile_create(blueprint),
            CommandKind::Add => self.compile_add(blueprint, command),
            CommandKind::Change => self.compile_change(blueprint, command),
            CommandKind::DropColumn => self.compile_drop_column(blueprint, command),
            CommandKind::Rename => self.compile_rename(blueprint, command),
            CommandKind::RenameColumn => self.compile_rename_column(blueprint, command),
            CommandKind::Index => self.compile_index(blueprint, command),
            CommandKind::Unique => self.compile_unique(blueprint, command),
            CommandKind::Fulltext => self.compile_fulltext(blueprint, command),
            CommandKind::Primary => self.compile_primary(blueprint, command),
            CommandKind::DropIndex => self.compile_drop_index(blueprint, command),
            CommandKind::DropUnique => self.compile_drop_unique(blueprint, command),
            CommandKind::DropFulltext => self.compile_drop_fulltext(blueprint, command),
            CommandKind::DropPrimary => self.compile_drop_primary(blueprint, command),
            CommandKind::Foreign => self.compile_foreign(blueprint, command),
            CommandKind::DropForeign => self.compile_drop_foreign(blueprint, command),
            CommandKind::Comment => self.compile_comment(blueprint, command),
            CommandKind::TableComment => self.compile_table_comment(blueprint, command),
            CommandKind::Drop => Ok(vec![self.compile_drop(blueprint)]),
            CommandKind::DropIfExists => Ok(vec![self.compile_drop_if_exists(blueprint)]),
        }
    }

    // DDL

    fn compile_create(&self, blueprint: &Blueprint) -> SchemaResult<Vec<String>>;
    fn compile_add(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    /// Redefine a column; may take several statements and is not atomic
    fn compile_change(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_drop_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_rename(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_rename_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_comment(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_table_comment(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;

    fn compile_drop(&self, blueprint: &Blueprint) -> String {
        format!("drop table {}", self.wrap_table(blueprint))
    }

    fn compile_drop_if_exists(&self, blueprint: &Blueprint) -> String {
        format!("drop table if exists {}", self.wrap_table(blueprint))
    }

    /// Drop every listed table; names are already qualified and unquoted
    fn compile_drop_all_tables(&self, tables: &[String]) -> Vec<String>;
    fn compile_drop_all_views(&self, views: &[String]) -> Vec<String>;

    /// Only PostgreSQL has droppable user types
    fn compile_drop_all_types(&self, _types: &[String]) -> Vec<String> {
        Vec::new()
    }

    fn compile_drop_all_domains(&self, _domains: &[String]) -> Vec<String> {
        Vec::new()
    }

    // Constraints

    fn compile_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_fulltext(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_primary(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_drop_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_drop_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_drop_fulltext(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_drop_primary(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;
    fn compile_drop_foreign(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>>;

    /// `alter table .. add constraint .. foreign key`; no action clause unless one was set
    fn compile_foreign(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let mut sql = format!(
            "alter table {} add constraint {} ",
            self.wrap_table(blueprint),
            self.wrap(command.index_name())
        );
        sql.push_str(&self.compile_foreign_reference(blueprint, command)?);
        Ok(vec![sql])
    }

    /// `foreign key (..) references t (..) [on delete ..] [on update ..]`
    fn compile_foreign_reference(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<String> {
        let on = command.on.as_deref().ok_or_else(|| {
            SchemaError::compilation(format!(
                "foreign key on {} does not name a referenced table",
                blueprint.get_table()
            ))
        })?;
        if command.references.is_empty() {
            return Err(SchemaError::compilation(format!(
                "foreign key on {} does not name referenced columns",
                blueprint.get_table()
            )));
        }

        let mut sql = format!(
            "foreign key ({}) references {} ({})",
            self.columnize(&command.columns),
            self.wrap_table_name(on, blueprint.get_prefix()),
            self.columnize(&command.references)
        );
        if let Some(action) = &command.on_delete {
            sql.push_str(&format!(" on delete {}", action));
        }
        if let Some(action) = &command.on_update {
            sql.push_str(&format!(" on update {}", action));
        }
        Ok(sql)
    }

    // Type mapping

    fn type_big_integer(&self, column: &ColumnDefinition) -> String;
    fn type_binary(&self, column: &ColumnDefinition) -> String;
    fn type_boolean(&self, column: &ColumnDefinition) -> String;
    fn type_char(&self, column: &ColumnDefinition) -> String;
    fn type_date(&self, column: &ColumnDefinition) -> String;
    fn type_date_time(&self, column: &ColumnDefinition) -> String;
    fn type_date_time_tz(&self, column: &ColumnDefinition) -> String;
    fn type_decimal(&self, column: &ColumnDefinition) -> String;
    fn type_double(&self, column: &ColumnDefinition) -> String;
    fn type_enum(&self, column: &ColumnDefinition) -> String;
    fn type_float(&self, column: &ColumnDefinition) -> String;
    fn type_integer(&self, column: &ColumnDefinition) -> String;
    fn type_json(&self, column: &ColumnDefinition) -> String;
    fn type_jsonb(&self, column: &ColumnDefinition) -> String;
    fn type_long_text(&self, column: &ColumnDefinition) -> String;
    fn type_medium_integer(&self, column: &ColumnDefinition) -> String;
    fn type_medium_text(&self, column: &ColumnDefinition) -> String;
    fn type_small_integer(&self, column: &ColumnDefinition) -> String;
    fn type_string(&self, column: &ColumnDefinition) -> String;
    fn type_text(&self, column: &ColumnDefinition) -> String;
    fn type_time(&self, column: &ColumnDefinition) -> String;
    fn type_time_tz(&self, column: &ColumnDefinition) -> String;
    fn type_timestamp(&self, column: &ColumnDefinition) -> String;
    fn type_timestamp_tz(&self, column: &ColumnDefinition) -> String;
    fn type_tiny_integer(&self, column: &ColumnDefinition) -> String;
    fn type_tiny_text(&self, column: &ColumnDefinition) -> String;
    fn type_uuid(&self, column: &ColumnDefinition) -> String;

    /// Native type of a column
    fn get_type(&self, column: &ColumnDefinition) -> String {
        match column.column_type {
            ColumnType::BigInteger => self.type_big_integer(column),
            ColumnType::Binary => self.type_binary(column),
            ColumnType::Boolean => self.type_boolean(column),
            ColumnType::Char => self.type_char(column),
            ColumnType::Date => self.type_date(column),
            ColumnType::DateTime => self.type_date_time(column),
            ColumnType::DateTimeTz => self.type_date_time_tz(column),
            ColumnType::Decimal => self.type_decimal(column),
            ColumnType::Double => self.type_double(column),
            ColumnType::Enum => self.type_enum(column),
            ColumnType::Float => self.type_float(column),
            ColumnType::Integer => self.type_integer(column),
            ColumnType::Json => self.type_json(column),
            ColumnType::Jsonb => self.type_jsonb(column),
            ColumnType::LongText => self.type_long_text(column),
            ColumnType::MediumInteger => self.type_medium_integer(column),
            ColumnType::MediumText => self.type_medium_text(column),
            ColumnType::SmallInteger => self.type_small_integer(column),
            ColumnType::String => self.type_string(column),
            ColumnType::Text => self.type_text(column),
            ColumnType::Time => self.type_time(column),
            ColumnType::TimeTz => self.type_time_tz(column),
            ColumnType::Timestamp => self.type_timestamp(column),
            ColumnType::TimestampTz => self.type_timestamp_tz(column),
            ColumnType::TinyInteger => self.type_tiny_integer(column),
            ColumnType::TinyText => self.type_tiny_text(column),
            ColumnType::Uuid => self.type_uuid(column),
        }
    }

    // Introspection queries

    /// Tables of a database (MySQL) or of every user schema
    fn compile_tables(&self, database: &str) -> String;
    fn compile_views(&self, database: &str) -> String;
    /// `None` when the dialect has no user-defined types
    fn compile_types(&self) -> Option<String> {
        None
    }
    fn compile_columns(&self, schema: &str, table: &str) -> String;
    fn compile_indexes(&self, schema: &str, table: &str) -> String;
    fn compile_foreign_keys(&self, schema: &str, table: &str) -> String;

    // JSON

    /// Expression extracting the value at a path, for comparisons
    fn compile_json_selector(&self, path: &JsonPath) -> String;

    /// `column->path` contains `value`
    fn compile_json_contains(&self, selector: &str, value: &JsonValue, not: bool) -> SchemaResult<CompiledSql>;

    /// The key or array index at the end of `selector` exists
    fn compile_json_contains_key(&self, selector: &str, not: bool) -> SchemaResult<String>;

    /// Compare the length of the array at `selector`
    fn compile_json_length(&self, selector: &str, operator: &str, length: i64) -> SchemaResult<CompiledSql> {
        let path = JsonPath::parse(selector)?;
        let operator = validate_operator(operator)?;
        Ok(CompiledSql::new(
            format!("{} {} ?", self.compile_json_length_expression(&path), operator),
            vec![length.into()],
        ))
    }

    fn compile_json_length_expression(&self, path: &JsonPath) -> String;

    /// Set clause merging every `column->path` update into one expression per column
    fn compile_json_columns_update(&self, values: &[(String, JsonValue)]) -> SchemaResult<CompiledSql>;

    // Query clauses

    fn compile_lock_for_update(&self) -> LockClause;
    fn compile_shared_lock(&self) -> LockClause;
    fn compile_random(&self, seed: Option<&str>) -> String;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    /// Rewrite `?` placeholders to the dialect style; `??` is a literal `?`
    fn prepare_placeholders(&self, sql: &str) -> String {
        prepare_placeholders(sql, self.placeholder_style())
    }
}

/// Choose the grammar for a connection
pub fn grammar_for(config: &ConnectionConfig) -> Box<dyn Grammar> {
    match config.driver {
        Dialect::MySql => Box::new(MySqlGrammar::new(config)),
        Dialect::Postgres => Box::new(PostgresGrammar::new()),
        Dialect::Sqlite => Box::new(SqliteGrammar::new()),
        Dialect::SqlServer => Box::new(SqlServerGrammar::new()),
    }
}

/// Rewrite placeholders outside of string literals
pub fn prepare_placeholders(sql: &str, style: PlaceholderStyle) -> String {
    let mut output = String::with_capacity(sql.len() + 8);
    let mut chars = sql.chars().peekable();
    let mut in_literal = false;
    let mut position = 0;

    while let Some(ch) = chars.next() {
        if ch == '\'' {
            in_literal = !in_literal;
            output.push(ch);
            continue;
        }
        if ch != '?' || in_literal {
            output.push(ch);
            continue;
        }
        if chars.peek() == Some(&'?') {
            chars.next();
            output.push('?');
            continue;
        }

        position += 1;
        match style {
            PlaceholderStyle::Question => output.push('?'),
            PlaceholderStyle::Dollar => output.push_str(&format!("${}", position)),
            PlaceholderStyle::AtP => output.push_str(&format!("@p{}", position)),
        }
    }

    output
}

/// Only plain comparison operators reach the SQL text
pub(crate) fn validate_operator(operator: &str) -> SchemaResult<&str> {
    match operator.trim() {
        op @ ("=" | "<" | ">" | "<=" | ">=" | "<>" | "!=") => Ok(op),
        other => Err(SchemaError::compilation(format!("invalid comparison operator '{}'", other))),
    }
}

/// Column carried by an add / change / comment command
pub(crate) fn command_column(command: &Command) -> SchemaResult<&ColumnDefinition> {
    command
        .column
        .as_ref()
        .ok_or_else(|| SchemaError::compilation(format!("{:?} command carries no column", command.kind)))
}

/// Required string option of a command (`to`, `from`)
pub(crate) fn required<'a>(value: &'a Option<String>, what: &str) -> SchemaResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| SchemaError::compilation(format!("command is missing its {}", what)))
}
