//! Column Definitions
//!
//! Fluent per-column attribute accumulator used inside blueprint callbacks.
//! Nothing here produces SQL; the grammars read these attributes.

use serde::{Deserialize, Serialize};

/// Default string length when none is given
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Semantic column type, independent of any dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    BigInteger,
    Binary,
    Boolean,
    Char,
    Date,
    DateTime,
    DateTimeTz,
    Decimal,
    Double,
    Enum,
    Float,
    Integer,
    Json,
    Jsonb,
    LongText,
    MediumInteger,
    MediumText,
    SmallInteger,
    String,
    Text,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    TinyInteger,
    TinyText,
    Uuid,
}

impl ColumnType {
    /// Integer family, the only types that may auto-increment
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::BigInteger
                | ColumnType::Integer
                | ColumnType::MediumInteger
                | ColumnType::SmallInteger
                | ColumnType::TinyInteger
        )
    }
}

/// Column default value
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Raw SQL expression, emitted verbatim
    Expression(String),
}

impl DefaultValue {
    /// Create a raw expression default, e.g. `CURRENT_TIMESTAMP`
    pub fn expression(sql: impl Into<String>) -> Self {
        DefaultValue::Expression(sql.into())
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Int(i64::from(value))
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Int(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::String(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::String(value)
    }
}

/// One column declared in a blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub length: Option<u32>,
    /// Decimal precision
    pub total: Option<u32>,
    /// Decimal scale
    pub places: Option<u32>,
    /// Fractional seconds precision for time types, or float precision
    pub precision: Option<u32>,
    /// Allowed values of an enum column
    pub allowed: Vec<String>,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub comment: Option<String>,
    pub collation: Option<String>,
    pub unsigned: bool,
    pub auto_increment: bool,
    /// The column already exists and is being redefined
    pub change: bool,
    pub first: bool,
    pub after: Option<String>,
    /// Identity column; the string holds optional sequence options
    pub generated_as: Option<String>,
    pub always: bool,
    pub use_current: bool,
    pub use_current_on_update: bool,
    pub primary: bool,
    pub unique: bool,
    pub index: bool,
}

impl ColumnDefinition {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            length: None,
            total: None,
            places: None,
            precision: None,
            allowed: Vec::new(),
            nullable: false,
            default: None,
            comment: None,
            collation: None,
            unsigned: false,
            auto_increment: false,
            change: false,
            first: false,
            after: None,
            generated_as: None,
            always: false,
            use_current: false,
            use_current_on_update: false,
            primary: false,
            unique: false,
            index: false,
        }
    }

    /// Allow NULL values
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Explicitly disallow NULL values (useful with `change`)
    pub fn not_nullable(&mut self) -> &mut Self {
        self.nullable = false;
        self
    }

    /// Set a default value
    pub fn default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }

    /// Mark an integer column unsigned (MySQL)
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    /// Auto-increment primary key
    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    /// Redefine an existing column instead of adding it
    pub fn change(&mut self) -> &mut Self {
        self.change = true;
        self
    }

    /// Place the column first in the table (MySQL)
    pub fn first(&mut self) -> &mut Self {
        self.first = true;
        self
    }

    /// Place the column after another column (MySQL)
    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.after = Some(column.into());
        self
    }

    /// Identity column (PostgreSQL), optionally with sequence options
    pub fn generated_as(&mut self, options: Option<&str>) -> &mut Self {
        self.generated_as = Some(options.unwrap_or_default().to_string());
        self
    }

    /// Use `generated always` instead of `generated by default`
    pub fn always(&mut self) -> &mut Self {
        self.always = true;
        self
    }

    /// Default to the current timestamp
    pub fn use_current(&mut self) -> &mut Self {
        self.use_current = true;
        self
    }

    /// Update to the current timestamp whenever the row changes (MySQL)
    pub fn use_current_on_update(&mut self) -> &mut Self {
        self.use_current_on_update = true;
        self
    }

    /// Add a primary key over this column
    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    /// Add a unique index over this column
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Add a plain index over this column
    pub fn index(&mut self) -> &mut Self {
        self.index = true;
        self
    }

    /// Length for string columns, defaulted
    pub fn string_length(&self) -> u32 {
        self.length.unwrap_or(DEFAULT_STRING_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_modifiers() {
        let mut column = ColumnDefinition::new("votes", ColumnType::Integer);
        column.unsigned().nullable().default(0).comment("vote count").after("name");

        assert!(column.unsigned);
        assert!(column.nullable);
        assert_eq!(column.default, Some(DefaultValue::Int(0)));
        assert_eq!(column.comment.as_deref(), Some("vote count"));
        assert_eq!(column.after.as_deref(), Some("name"));
        assert!(!column.change);
    }

    #[test]
    fn test_string_length_default() {
        let mut column = ColumnDefinition::new("name", ColumnType::String);
        assert_eq!(column.string_length(), 255);
        column.length = Some(100);
        assert_eq!(column.string_length(), 100);
    }
}
