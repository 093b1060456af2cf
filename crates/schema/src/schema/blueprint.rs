//! Blueprint - in-memory description of one table creation or alteration
//!
//! A blueprint is created per `create`/`table` call, filled by the caller's
//! callback, compiled once by a [`Grammar`] and then dropped.

use super::column::{ColumnDefinition, ColumnType};
use super::command::{Command, CommandKind, ForeignKeyDefinition, IndexDefinition};
use super::grammars::Grammar;
use crate::error::SchemaResult;

/// Table blueprint
#[derive(Debug, Clone)]
pub struct Blueprint {
    schema: Option<String>,
    table: String,
    prefix: String,
    columns: Vec<ColumnDefinition>,
    commands: Vec<Command>,
    implied: bool,
    /// Table options for MySQL `create table`
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub engine: Option<String>,
}

impl Blueprint {
    /// Create a blueprint for `table`, which may be qualified as `schema.table`
    pub fn new(table: &str, prefix: &str) -> Self {
        let (schema, table) = match table.rsplit_once('.') {
            Some((schema, table)) => (Some(schema.to_string()), table.to_string()),
            None => (None, table.to_string()),
        };

        Self {
            schema,
            table,
            prefix: prefix.to_string(),
            columns: Vec::new(),
            commands: Vec::new(),
            implied: false,
            charset: None,
            collation: None,
            engine: None,
        }
    }

    /// Table name with the prefix applied
    pub fn get_table(&self) -> String {
        format!("{}{}", self.prefix, self.table)
    }

    /// Table name with prefix and schema qualifier, e.g. `crm.app_users`
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.get_table()),
            None => self.get_table(),
        }
    }

    pub fn get_schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn get_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get_columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Columns being added, in declaration order
    pub fn get_added_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns.iter().filter(|column| !column.change).collect()
    }

    /// Columns being redefined
    pub fn get_changed_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns.iter().filter(|column| column.change).collect()
    }

    pub fn get_commands(&self) -> &[Command] {
        &self.commands
    }

    /// Commands of one kind, in order
    pub fn commands_of(&self, kind: CommandKind) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(move |command| command.kind == kind)
    }

    pub fn has_command(&self, kind: CommandKind) -> bool {
        self.commands.iter().any(|command| command.kind == kind)
    }

    /// Whether this blueprint creates the table
    pub fn is_creating(&self) -> bool {
        self.has_command(CommandKind::Create)
    }

    /// Compile the blueprint into an ordered, non-atomic sequence of statements
    pub fn to_sql(&mut self, grammar: &dyn Grammar) -> SchemaResult<Vec<String>> {
        self.add_implied_commands();

        let mut statements = Vec::new();
        for command in &self.commands {
            statements.extend(grammar.compile_command(self, command)?);
        }
        Ok(statements)
    }

    fn add_implied_commands(&mut self) {
        if self.implied {
            return;
        }
        self.implied = true;

        let creating = self.is_creating();
        let mut leading = Vec::new();
        if !creating {
            leading.extend(
                self.columns
                    .iter()
                    .filter(|column| !column.change)
                    .map(|column| Command::with_column(CommandKind::Add, column.clone())),
            );
            leading.extend(
                self.columns
                    .iter()
                    .filter(|column| column.change)
                    .map(|column| Command::with_column(CommandKind::Change, column.clone())),
            );
        }

        let insert_at = usize::from(creating);
        for (offset, command) in leading.into_iter().enumerate() {
            self.commands.insert(insert_at + offset, command);
        }

        let mut trailing = Vec::new();
        for column in &self.columns {
            for (flag, kind) in [
                (column.primary, CommandKind::Primary),
                (column.unique, CommandKind::Unique),
                (column.index, CommandKind::Index),
            ] {
                if flag {
                    let columns = vec![column.name.clone()];
                    let mut command = Command::with_columns(kind, columns.clone());
                    command.index = Some(self.create_index_name(kind, &columns));
                    trailing.push(command);
                }
            }
        }
        for column in self.columns.iter().filter(|column| !column.change) {
            if column.comment.is_some() {
                trailing.push(Command::with_column(CommandKind::Comment, column.clone()));
            }
        }
        self.commands.extend(trailing);
    }

    /// Generate an index name: `{prefix}{table}_{columns}_{type}`
    pub fn create_index_name(&self, kind: CommandKind, columns: &[String]) -> String {
        let table = match &self.schema {
            Some(schema) => format!("{}.{}{}", schema, self.prefix, self.table),
            None => format!("{}{}", self.prefix, self.table),
        };
        let mut name = table;
        for column in columns {
            name.push('_');
            name.push_str(column);
        }
        name.push('_');
        name.push_str(kind.index_suffix());

        name.to_lowercase().replace(['-', '.'], "_")
    }

    fn add_column(&mut self, name: &str, column_type: ColumnType) -> &mut ColumnDefinition {
        self.columns.push(ColumnDefinition::new(name, column_type));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    fn add_command(&mut self, command: Command) -> &mut Command {
        self.commands.push(command);
        let last = self.commands.len() - 1;
        &mut self.commands[last]
    }

    fn index_command(&mut self, kind: CommandKind, columns: &[&str]) -> &mut Command {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let name = self.create_index_name(kind, &columns);
        let command = self.add_command(Command::with_columns(kind, columns));
        command.index = Some(name);
        command
    }

    fn drop_index_command(&mut self, kind: CommandKind, index: &str) -> &mut Command {
        let command = self.add_command(Command::new(kind));
        command.index = Some(index.to_string());
        command
    }

    fn drop_index_by_columns_command(&mut self, kind: CommandKind, columns: &[&str]) -> &mut Command {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let name = self.create_index_name(kind, &columns);
        let command = self.add_command(Command::with_columns(kind, columns));
        command.index = Some(name);
        command
    }

    // Table commands

    /// Mark the blueprint as creating the table
    pub fn create(&mut self) -> &mut Self {
        if !self.is_creating() {
            self.commands.insert(0, Command::new(CommandKind::Create));
        }
        self
    }

    pub fn drop(&mut self) -> &mut Self {
        self.add_command(Command::new(CommandKind::Drop));
        self
    }

    pub fn drop_if_exists(&mut self) -> &mut Self {
        self.add_command(Command::new(CommandKind::DropIfExists));
        self
    }

    /// Rename the table
    pub fn rename(&mut self, to: &str) -> &mut Self {
        let command = self.add_command(Command::new(CommandKind::Rename));
        command.to = Some(to.to_string());
        self
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> &mut Self {
        let command = self.add_command(Command::new(CommandKind::RenameColumn));
        command.from = Some(from.to_string());
        command.to = Some(to.to_string());
        self
    }

    pub fn drop_column(&mut self, columns: &[&str]) -> &mut Self {
        self.add_command(Command::with_columns(
            CommandKind::DropColumn,
            columns.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    /// Table comment
    pub fn comment(&mut self, comment: &str) -> &mut Self {
        let command = self.add_command(Command::new(CommandKind::TableComment));
        command.value = Some(comment.to_string());
        self
    }

    pub fn drop_timestamps(&mut self) -> &mut Self {
        self.drop_column(&["created_at", "updated_at"])
    }

    pub fn drop_timestamps_tz(&mut self) -> &mut Self {
        self.drop_timestamps()
    }

    pub fn drop_soft_deletes(&mut self) -> &mut Self {
        self.drop_column(&["deleted_at"])
    }

    pub fn drop_soft_deletes_tz(&mut self) -> &mut Self {
        self.drop_soft_deletes()
    }

    // Index commands

    pub fn index(&mut self, columns: &[&str]) -> IndexDefinition<'_> {
        IndexDefinition(self.index_command(CommandKind::Index, columns))
    }

    pub fn unique(&mut self, columns: &[&str]) -> IndexDefinition<'_> {
        IndexDefinition(self.index_command(CommandKind::Unique, columns))
    }

    pub fn fulltext(&mut self, columns: &[&str]) -> IndexDefinition<'_> {
        IndexDefinition(self.index_command(CommandKind::Fulltext, columns))
    }

    pub fn primary(&mut self, columns: &[&str]) -> IndexDefinition<'_> {
        IndexDefinition(self.index_command(CommandKind::Primary, columns))
    }

    pub fn drop_index(&mut self, index: &str) -> &mut Self {
        self.drop_index_command(CommandKind::DropIndex, index);
        self
    }

    pub fn drop_index_by_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.drop_index_by_columns_command(CommandKind::DropIndex, columns);
        self
    }

    pub fn drop_unique(&mut self, index: &str) -> &mut Self {
        self.drop_index_command(CommandKind::DropUnique, index);
        self
    }

    pub fn drop_unique_by_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.drop_index_by_columns_command(CommandKind::DropUnique, columns);
        self
    }

    pub fn drop_fulltext(&mut self, index: &str) -> &mut Self {
        self.drop_index_command(CommandKind::DropFulltext, index);
        self
    }

    pub fn drop_fulltext_by_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.drop_index_by_columns_command(CommandKind::DropFulltext, columns);
        self
    }

    /// Drop the primary key; name it with `.name(..)` where the dialect needs one
    pub fn drop_primary(&mut self) -> IndexDefinition<'_> {
        let name = self.create_index_name(CommandKind::Primary, &[]);
        let command = self.add_command(Command::new(CommandKind::DropPrimary));
        command.index = Some(name);
        IndexDefinition(command)
    }

    // Foreign keys

    /// Add a foreign key over `columns`
    pub fn foreign(&mut self, columns: &[&str]) -> ForeignKeyDefinition<'_> {
        ForeignKeyDefinition(self.index_command(CommandKind::Foreign, columns))
    }

    pub fn drop_foreign(&mut self, index: &str) -> &mut Self {
        self.drop_index_command(CommandKind::DropForeign, index);
        self
    }

    pub fn drop_foreign_by_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.drop_index_by_columns_command(CommandKind::DropForeign, columns);
        self
    }

    // Column types

    /// Auto-incrementing unsigned big integer `id` primary key
    pub fn id(&mut self) -> &mut ColumnDefinition {
        self.big_increments("id")
    }

    /// Auto-incrementing unsigned big integer primary key
    pub fn big_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_big_integer(name).auto_increment()
    }

    /// Auto-incrementing unsigned integer primary key
    pub fn increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_integer(name).auto_increment()
    }

    pub fn integer_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.increments(name)
    }

    pub fn medium_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::MediumInteger).unsigned().auto_increment()
    }

    pub fn small_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::SmallInteger).unsigned().auto_increment()
    }

    pub fn tiny_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TinyInteger).unsigned().auto_increment()
    }

    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::BigInteger)
    }

    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Integer)
    }

    pub fn medium_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::MediumInteger)
    }

    pub fn small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::SmallInteger)
    }

    pub fn tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TinyInteger)
    }

    pub fn unsigned_big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.big_integer(name).unsigned()
    }

    pub fn unsigned_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.integer(name).unsigned()
    }

    pub fn unsigned_medium_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.medium_integer(name).unsigned()
    }

    pub fn unsigned_small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.small_integer(name).unsigned()
    }

    pub fn unsigned_tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.tiny_integer(name).unsigned()
    }

    /// Unsigned big integer meant to reference another table's `id`
    pub fn foreign_id(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_big_integer(name)
    }

    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Boolean)
    }

    pub fn char(&mut self, name: &str, length: Option<u32>) -> &mut ColumnDefinition {
        let column = self.add_column(name, ColumnType::Char);
        column.length = Some(length.unwrap_or(super::column::DEFAULT_STRING_LENGTH));
        column
    }

    /// Variable-length string, 255 characters unless given
    pub fn string(&mut self, name: &str, length: Option<u32>) -> &mut ColumnDefinition {
        let column = self.add_column(name, ColumnType::String);
        column.length = Some(length.unwrap_or(super::column::DEFAULT_STRING_LENGTH));
        column
    }

    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Text)
    }

    pub fn tiny_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TinyText)
    }

    pub fn medium_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::MediumText)
    }

    pub fn long_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::LongText)
    }

    pub fn decimal(&mut self, name: &str, total: u32, places: u32) -> &mut ColumnDefinition {
        let column = self.add_column(name, ColumnType::Decimal);
        column.total = Some(total);
        column.places = Some(places);
        column
    }

    pub fn double(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Double)
    }

    /// Float with binary precision (53 unless given)
    pub fn float(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        let column = self.add_column(name, ColumnType::Float);
        column.precision = Some(precision.unwrap_or(53));
        column
    }

    /// Enum column restricted to `allowed`
    pub fn enumeration(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let column = self.add_column(name, ColumnType::Enum);
        column.allowed = allowed.iter().map(|value| value.to_string()).collect();
        column
    }

    pub fn json(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Json)
    }

    pub fn jsonb(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Jsonb)
    }

    pub fn uuid(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Uuid)
    }

    pub fn binary(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Binary)
    }

    pub fn date(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Date)
    }

    pub fn date_time(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        self.add_precise_column(name, ColumnType::DateTime, precision)
    }

    pub fn date_time_tz(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        self.add_precise_column(name, ColumnType::DateTimeTz, precision)
    }

    pub fn time(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        self.add_precise_column(name, ColumnType::Time, precision)
    }

    pub fn time_tz(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        self.add_precise_column(name, ColumnType::TimeTz, precision)
    }

    pub fn timestamp(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        self.add_precise_column(name, ColumnType::Timestamp, precision)
    }

    pub fn timestamp_tz(&mut self, name: &str, precision: Option<u32>) -> &mut ColumnDefinition {
        self.add_precise_column(name, ColumnType::TimestampTz, precision)
    }

    /// Nullable `created_at` and `updated_at` timestamps
    pub fn timestamps(&mut self, precision: Option<u32>) -> &mut Self {
        self.timestamp("created_at", precision).nullable();
        self.timestamp("updated_at", precision).nullable();
        self
    }

    pub fn timestamps_tz(&mut self, precision: Option<u32>) -> &mut Self {
        self.timestamp_tz("created_at", precision).nullable();
        self.timestamp_tz("updated_at", precision).nullable();
        self
    }

    /// Nullable `deleted_at` timestamp
    pub fn soft_deletes(&mut self, precision: Option<u32>) -> &mut ColumnDefinition {
        self.timestamp("deleted_at", precision).nullable()
    }

    pub fn soft_deletes_tz(&mut self, precision: Option<u32>) -> &mut ColumnDefinition {
        self.timestamp_tz("deleted_at", precision).nullable()
    }

    fn add_precise_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        precision: Option<u32>,
    ) -> &mut ColumnDefinition {
        let column = self.add_column(name, column_type);
        column.precision = precision;
        column
    }
}
