//! Blueprint commands
//!
//! A command is one table-level operation. Index and foreign-key commands are
//! refined through the [`IndexDefinition`] and [`ForeignKeyDefinition`]
//! builders returned by the blueprint.

use super::column::ColumnDefinition;

/// Table-level operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Create,
    Add,
    Change,
    DropColumn,
    Rename,
    RenameColumn,
    Index,
    Unique,
    Fulltext,
    Primary,
    DropIndex,
    DropUnique,
    DropFulltext,
    DropPrimary,
    Foreign,
    DropForeign,
    /// Column comment
    Comment,
    TableComment,
    Drop,
    DropIfExists,
}

impl CommandKind {
    /// Suffix used when generating index names
    pub fn index_suffix(&self) -> &'static str {
        match self {
            CommandKind::Unique | CommandKind::DropUnique => "unique",
            CommandKind::Fulltext | CommandKind::DropFulltext => "fulltext",
            CommandKind::Primary | CommandKind::DropPrimary => "primary",
            CommandKind::Foreign | CommandKind::DropForeign => "foreign",
            _ => "index",
        }
    }
}

/// One table-level operation with its options
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    /// Columns targeted by the command
    pub columns: Vec<String>,
    /// Index or constraint name
    pub index: Option<String>,
    /// Index algorithm (`btree`, `hash`, `gin`, ...)
    pub algorithm: Option<String>,
    /// Text search configuration for PostgreSQL fulltext indexes
    pub language: Option<String>,
    /// Rename source / target
    pub from: Option<String>,
    pub to: Option<String>,
    /// Referenced table and columns for foreign keys
    pub on: Option<String>,
    pub references: Vec<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub deferrable: Option<bool>,
    pub initially_immediate: Option<bool>,
    /// Table comment text
    pub value: Option<String>,
    /// Column carried by add / change / comment commands
    pub column: Option<ColumnDefinition>,
}

impl Command {
    /// Create an empty command of the given kind
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            index: None,
            algorithm: None,
            language: None,
            from: None,
            to: None,
            on: None,
            references: Vec::new(),
            on_delete: None,
            on_update: None,
            deferrable: None,
            initially_immediate: None,
            value: None,
            column: None,
        }
    }

    pub fn with_columns(kind: CommandKind, columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Self::new(kind)
        }
    }

    pub fn with_column(kind: CommandKind, column: ColumnDefinition) -> Self {
        Self {
            columns: vec![column.name.clone()],
            column: Some(column),
            ..Self::new(kind)
        }
    }

    /// Index or constraint name, empty when unnamed
    pub fn index_name(&self) -> &str {
        self.index.as_deref().unwrap_or_default()
    }
}

/// Builder refining an index command
pub struct IndexDefinition<'a>(pub(crate) &'a mut Command);

impl<'a> IndexDefinition<'a> {
    /// Override the generated index name
    pub fn name(self, name: impl Into<String>) -> Self {
        self.0.index = Some(name.into());
        self
    }

    /// Index algorithm (MySQL `using`, PostgreSQL access method)
    pub fn algorithm(self, algorithm: impl Into<String>) -> Self {
        self.0.algorithm = Some(algorithm.into());
        self
    }

    /// Text search configuration for fulltext indexes (PostgreSQL)
    pub fn language(self, language: impl Into<String>) -> Self {
        self.0.language = Some(language.into());
        self
    }

    /// Make a PostgreSQL unique constraint deferrable
    pub fn deferrable(self) -> Self {
        self.0.deferrable = Some(true);
        self
    }

    pub fn initially_immediate(self) -> Self {
        self.0.initially_immediate = Some(true);
        self
    }
}

/// Builder refining a foreign key command
pub struct ForeignKeyDefinition<'a>(pub(crate) &'a mut Command);

impl<'a> ForeignKeyDefinition<'a> {
    /// Columns on the referenced table
    pub fn references(self, columns: &[&str]) -> Self {
        self.0.references = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Referenced table
    pub fn on(self, table: impl Into<String>) -> Self {
        self.0.on = Some(table.into());
        self
    }

    /// Override the generated constraint name
    pub fn name(self, name: impl Into<String>) -> Self {
        self.0.index = Some(name.into());
        self
    }

    pub fn on_delete(self, action: impl Into<String>) -> Self {
        self.0.on_delete = Some(action.into());
        self
    }

    pub fn on_update(self, action: impl Into<String>) -> Self {
        self.0.on_update = Some(action.into());
        self
    }

    pub fn cascade_on_delete(self) -> Self {
        self.on_delete("cascade")
    }

    pub fn cascade_on_update(self) -> Self {
        self.on_update("cascade")
    }

    pub fn restrict_on_delete(self) -> Self {
        self.on_delete("restrict")
    }

    pub fn restrict_on_update(self) -> Self {
        self.on_update("restrict")
    }

    pub fn null_on_delete(self) -> Self {
        self.on_delete("set null")
    }

    pub fn no_action_on_delete(self) -> Self {
        self.on_delete("no action")
    }

    pub fn no_action_on_update(self) -> Self {
        self.on_update("no action")
    }

    /// PostgreSQL only
    pub fn deferrable(self) -> Self {
        self.0.deferrable = Some(true);
        self
    }

    /// PostgreSQL only
    pub fn initially_immediate(self) -> Self {
        self.0.initially_immediate = Some(true);
        self
    }
}
