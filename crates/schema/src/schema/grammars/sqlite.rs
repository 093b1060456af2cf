//! SQLite grammar
//!
//! SQLite cannot alter columns or constraints of an existing table; those
//! commands are reported as unsupported rather than emulated by table
//! recreation.

use serde_json::Value as JsonValue;

use super::{command_column, required, Grammar, LockClause};
use crate::backends::{DatabaseValue, Dialect};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::blueprint::Blueprint;
use crate::schema::column::ColumnDefinition;
use crate::schema::command::{Command, CommandKind};
use crate::schema::json::{contained_scalars, group_updates, CompiledSql, JsonPath};

#[derive(Debug, Clone, Default)]
pub struct SqliteGrammar;

impl SqliteGrammar {
    pub fn new() -> Self {
        Self
    }

    fn unsupported(&self, what: &str) -> SchemaError {
        SchemaError::unsupported(Dialect::Sqlite, what)
    }

    fn modifiers(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        let mut sql = String::new();

        if column.auto_increment
            && column.column_type.is_integer()
            && !blueprint.has_command(CommandKind::Primary)
        {
            sql.push_str(" primary key autoincrement");
        }
        sql.push_str(if column.nullable { " null" } else { " not null" });
        if column.use_current {
            sql.push_str(" default CURRENT_TIMESTAMP");
        } else if let Some(default) = &column.default {
            sql.push_str(&format!(" default {}", self.get_default_value(default)));
        }
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" collate {}", self.wrap_value(collation)));
        }

        sql
    }

    /// `"field", '$."a"'`, or just the field at the document root
    fn json_field_and_path(&self, path: &JsonPath) -> String {
        let field = self.wrap(&path.column);
        if path.has_path() {
            format!("{}, {}", field, self.quote_string(&path.to_json_path()))
        } else {
            field
        }
    }

    fn foreign_clause(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<String> {
        let on = command
            .on
            .as_deref()
            .ok_or_else(|| SchemaError::compilation(format!("foreign key on {} does not name a referenced table", blueprint.get_table())))?;
        let mut sql = format!(
            "foreign key({}) references {}({})",
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
}

impl Grammar for SqliteGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn get_column(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        format!(
            "{} {}{}",
            self.wrap(&column.name),
            self.get_type(column),
            self.modifiers(blueprint, column)
        )
    }

    /// Foreign keys and the primary key are declared inline
    fn compile_create(&self, blueprint: &Blueprint) -> SchemaResult<Vec<String>> {
        if blueprint.get_schema().is_some() {
            return Err(self.unsupported("schema-qualified table names"));
        }

        let mut structure = self.get_columns(blueprint);
        for command in blueprint.commands_of(CommandKind::Foreign) {
            structure.push(self.foreign_clause(blueprint, command)?);
        }
        if let Some(primary) = blueprint.commands_of(CommandKind::Primary).next() {
            structure.push(format!("primary key ({})", self.columnize(&primary.columns)));
        }

        Ok(vec![format!(
            "create table {} ({})",
            self.wrap_table(blueprint),
            structure.join(", ")
        )])
    }

    fn compile_add(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        Ok(vec![format!(
            "alter table {} add column {}",
            self.wrap_table(blueprint),
            self.get_column(blueprint, column)
        )])
    }

    fn compile_change(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Err(self.unsupported("changing existing columns"))
    }

    /// One statement per column
    fn compile_drop_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let table = self.wrap_table(blueprint);
        Ok(command
            .columns
            .iter()
            .map(|column| format!("alter table {} drop column {}", table, self.wrap(column)))
            .collect())
    }

    fn compile_rename(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let to = required(&command.to, "new table name")?;
        Ok(vec![format!(
            "alter table {} rename to {}",
            self.wrap_table(blueprint),
            self.wrap_table_name(to, blueprint.get_prefix())
        )])
    }

    fn compile_rename_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} rename column {} to {}",
            self.wrap_table(blueprint),
            self.wrap(required(&command.from, "column to rename")?),
            self.wrap(required(&command.to, "new column name")?)
        )])
    }

    fn compile_comment(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn compile_table_comment(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// One script so the pragma applies to every drop
    fn compile_drop_all_tables(&self, tables: &[String]) -> Vec<String> {
        if tables.is_empty() {
            return Vec::new();
        }
        let mut script = vec!["pragma foreign_keys = off".to_string()];
        script.extend(tables.iter().map(|table| format!("drop table if exists {}", self.wrap(table))));
        script.push("pragma foreign_keys = on".to_string());
        vec![script.join("; ")]
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Vec<String> {
        views
            .iter()
            .map(|view| format!("drop view if exists {}", self.wrap(view)))
            .collect()
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "create index {} on {} ({})",
            self.wrap_value(command.index_name()),
            self.wrap_table(blueprint),
            self.columnize(&command.columns)
        )])
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "create unique index {} on {} ({})",
            self.wrap_value(command.index_name()),
            self.wrap_table(blueprint),
            self.columnize(&command.columns)
        )])
    }

    fn compile_fulltext(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Err(self.unsupported("fulltext indexes"))
    }

    fn compile_primary(&self, blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        if blueprint.is_creating() {
            return Ok(Vec::new());
        }
        Err(self.unsupported("adding a primary key to an existing table"))
    }

    fn compile_foreign(&self, blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        if blueprint.is_creating() {
            return Ok(Vec::new());
        }
        Err(self.unsupported("adding a foreign key to an existing table"))
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!("drop index {}", self.wrap_value(command.index_name()))])
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        self.compile_drop_index(blueprint, command)
    }

    fn compile_drop_fulltext(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Err(self.unsupported("fulltext indexes"))
    }

    fn compile_drop_primary(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Err(self.unsupported("dropping a primary key"))
    }

    fn compile_drop_foreign(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Err(self.unsupported("dropping a foreign key"))
    }

    fn type_big_integer(&self, _column: &ColumnDefinition) -> String {
        "integer".to_string()
    }

    fn type_binary(&self, _column: &ColumnDefinition) -> String {
        "blob".to_string()
    }

    fn type_boolean(&self, _column: &ColumnDefinition) -> String {
        "tinyint(1)".to_string()
    }

    fn type_char(&self, _column: &ColumnDefinition) -> String {
        "varchar".to_string()
    }

    fn type_date(&self, _column: &ColumnDefinition) -> String {
        "date".to_string()
    }

    fn type_date_time(&self, _column: &ColumnDefinition) -> String {
        "datetime".to_string()
    }

    fn type_date_time_tz(&self, _column: &ColumnDefinition) -> String {
        "datetime".to_string()
    }

    fn type_decimal(&self, _column: &ColumnDefinition) -> String {
        "numeric".to_string()
    }

    fn type_double(&self, _column: &ColumnDefinition) -> String {
        "double".to_string()
    }

    fn type_enum(&self, column: &ColumnDefinition) -> String {
        format!(
            "varchar check ({} in ({}))",
            self.wrap(&column.name),
            self.quote_strings(&column.allowed)
        )
    }

    fn type_float(&self, _column: &ColumnDefinition) -> String {
        "float".to_string()
    }

    fn type_integer(&self, _column: &ColumnDefinition) -> String {
        "integer".to_string()
    }

    fn type_json(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_jsonb(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_long_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_medium_integer(&self, _column: &ColumnDefinition) -> String {
        "integer".to_string()
    }

    fn type_medium_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_small_integer(&self, _column: &ColumnDefinition) -> String {
        "integer".to_string()
    }

    fn type_string(&self, _column: &ColumnDefinition) -> String {
        "varchar".to_string()
    }

    fn type_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_time(&self, _column: &ColumnDefinition) -> String {
        "time".to_string()
    }

    fn type_time_tz(&self, _column: &ColumnDefinition) -> String {
        "time".to_string()
    }

    fn type_timestamp(&self, _column: &ColumnDefinition) -> String {
        "datetime".to_string()
    }

    fn type_timestamp_tz(&self, _column: &ColumnDefinition) -> String {
        "datetime".to_string()
    }

    fn type_tiny_integer(&self, _column: &ColumnDefinition) -> String {
        "integer".to_string()
    }

    fn type_tiny_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_uuid(&self, _column: &ColumnDefinition) -> String {
        "varchar".to_string()
    }

    fn compile_tables(&self, _database: &str) -> String {
        "select name as \"name\", 'main' as \"schema\" from sqlite_master \
         where type = 'table' and name not like 'sqlite_%' order by name"
            .to_string()
    }

    fn compile_views(&self, _database: &str) -> String {
        "select name as \"name\", 'main' as \"schema\", sql as \"definition\" from sqlite_master \
         where type = 'view' order by name"
            .to_string()
    }

    fn compile_columns(&self, _schema: &str, table: &str) -> String {
        format!(
            "select name as \"name\", type as \"type\", not \"notnull\" as \"nullable\", \
             dflt_value as \"default\", pk as \"primary\", hidden as \"extra\" \
             from pragma_table_xinfo({}) order by cid asc",
            self.quote_string(table)
        )
    }

    /// The rowid primary key has no index of its own, so it is synthesized
    fn compile_indexes(&self, _schema: &str, table: &str) -> String {
        let table = self.quote_string(table);
        format!(
            "select 'primary' as \"name\", group_concat(col) as \"columns\", 1 as \"unique\", 1 as \"primary\" \
             from (select name as col from pragma_table_info({table}) where pk > 0 order by pk, cid) group by \"name\" \
             union select name as \"name\", group_concat(col) as \"columns\", \"unique\", origin = 'pk' as \"primary\" \
             from (select il.*, ii.name as col from pragma_index_list({table}) il, pragma_index_info(il.name) ii \
             order by il.seq, ii.seqno) group by name, \"unique\", \"primary\"",
            table = table
        )
    }

    fn compile_foreign_keys(&self, _schema: &str, table: &str) -> String {
        format!(
            "select '' as \"name\", group_concat(\"from\") as \"columns\", 'main' as \"foreign_schema\", \
             \"table\" as \"foreign_table\", group_concat(\"to\") as \"foreign_columns\", \
             on_update as \"on_update\", on_delete as \"on_delete\" \
             from (select * from pragma_foreign_key_list({}) order by id desc, seq) \
             group by id, \"table\", on_update, on_delete",
            self.quote_string(table)
        )
    }

    fn compile_json_selector(&self, path: &JsonPath) -> String {
        if !path.has_path() {
            return self.wrap(&path.column);
        }
        format!("json_extract({})", self.json_field_and_path(path))
    }

    /// One `json_each` probe per contained scalar
    fn compile_json_contains(&self, selector: &str, value: &JsonValue, not: bool) -> SchemaResult<CompiledSql> {
        let path = JsonPath::parse(selector)?;
        let scalars = contained_scalars(value, "sqlite json containment")?;
        let source = self.json_field_and_path(&path);

        let sql = if scalars.is_empty() {
            "1 = 1".to_string()
        } else {
            scalars
                .iter()
                .map(|_| {
                    format!(
                        "exists (select 1 from json_each({}) where \"json_each\".\"value\" is ?)",
                        source
                    )
                })
                .collect::<Vec<_>>()
                .join(" and ")
        };

        let sql = match (not, scalars.len() > 1) {
            (false, _) => sql,
            (true, false) => format!("not {}", sql),
            (true, true) => format!("not ({})", sql),
        };
        Ok(CompiledSql::new(sql, scalars))
    }

    fn compile_json_contains_key(&self, selector: &str, not: bool) -> SchemaResult<String> {
        let path = JsonPath::parse(selector)?;
        if !path.has_path() {
            return Err(SchemaError::compilation(format!("'{}' does not name a json key", selector)));
        }
        let sql = format!("json_type({}) is not null", self.json_field_and_path(&path));
        Ok(if not { format!("not {}", sql) } else { sql })
    }

    fn compile_json_length_expression(&self, path: &JsonPath) -> String {
        format!("json_array_length({})", self.json_field_and_path(path))
    }

    /// `json(?)` keeps nested documents and booleans typed
    fn compile_json_columns_update(&self, values: &[(String, JsonValue)]) -> SchemaResult<CompiledSql> {
        let mut clauses = Vec::new();
        let mut bindings = Vec::new();

        for (column, paths) in group_updates(values)? {
            let field = self.wrap(&column);
            let arguments = paths
                .into_iter()
                .map(|(path, value)| {
                    bindings.push(DatabaseValue::String(value.to_string()));
                    format!("{}, json(?)", self.quote_string(&path.to_json_path()))
                })
                .collect::<Vec<_>>()
                .join(", ");
            clauses.push(format!("{} = json_set({}, {})", field, field, arguments));
        }

        Ok(CompiledSql::new(clauses.join(", "), bindings))
    }

    fn compile_lock_for_update(&self) -> LockClause {
        LockClause::suffix("")
    }

    fn compile_shared_lock(&self) -> LockClause {
        LockClause::suffix("")
    }

    fn compile_random(&self, _seed: Option<&str>) -> String {
        "random()".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_create_inlines_constraints() {
        let mut blueprint = Blueprint::new("posts", "");
        blueprint.create();
        blueprint.id();
        blueprint.foreign_id("user_id");
        blueprint.string("title", None).default("untitled");
        blueprint.boolean("published").nullable();
        blueprint.foreign(&["user_id"]).references(&["id"]).on("users").cascade_on_delete();
        blueprint.index(&["title"]);

        let sql = blueprint.to_sql(&SqliteGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table \"posts\" (\"id\" integer primary key autoincrement not null, \
                 \"user_id\" integer not null, \"title\" varchar not null default 'untitled', \
                 \"published\" tinyint(1) null, \
                 foreign key(\"user_id\") references \"users\"(\"id\") on delete cascade)",
                "create index \"posts_title_index\" on \"posts\" (\"title\")",
            ]
        );
    }

    #[test]
    fn test_compile_create_with_composite_primary() {
        let mut blueprint = Blueprint::new("role_user", "");
        blueprint.create();
        blueprint.integer("role_id");
        blueprint.integer("user_id");
        blueprint.primary(&["role_id", "user_id"]);

        let sql = blueprint.to_sql(&SqliteGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table \"role_user\" (\"role_id\" integer not null, \"user_id\" integer not null, \
                 primary key (\"role_id\", \"user_id\"))"
            ]
        );
    }

    #[test]
    fn test_alter_statements() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.string("nickname", None).nullable();
        blueprint.drop_column(&["age", "bio"]);
        blueprint.rename_column("name", "full_name");
        blueprint.unique(&["nickname"]);
        blueprint.drop_unique("users_email_unique");

        let sql = blueprint.to_sql(&SqliteGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table \"users\" add column \"nickname\" varchar null",
                "alter table \"users\" drop column \"age\"",
                "alter table \"users\" drop column \"bio\"",
                "alter table \"users\" rename column \"name\" to \"full_name\"",
                "create unique index \"users_nickname_unique\" on \"users\" (\"nickname\")",
                "drop index \"users_email_unique\"",
            ]
        );
    }

    #[test]
    fn test_unsupported_alterations() {
        let grammar = SqliteGrammar::new();

        let mut blueprint = Blueprint::new("users", "");
        blueprint.string("name", Some(100)).change();
        assert!(matches!(blueprint.to_sql(&grammar), Err(SchemaError::Unsupported { .. })));

        let mut blueprint = Blueprint::new("posts", "");
        blueprint.foreign(&["user_id"]).references(&["id"]).on("users");
        assert!(matches!(blueprint.to_sql(&grammar), Err(SchemaError::Unsupported { .. })));

        let mut blueprint = Blueprint::new("posts", "");
        blueprint.drop_foreign("posts_user_id_foreign");
        assert!(matches!(blueprint.to_sql(&grammar), Err(SchemaError::Unsupported { .. })));

        let mut blueprint = Blueprint::new("main.users", "");
        blueprint.create();
        blueprint.id();
        assert!(matches!(blueprint.to_sql(&grammar), Err(SchemaError::Unsupported { .. })));
    }

    #[test]
    fn test_drop_all_tables_is_one_script() {
        let grammar = SqliteGrammar::new();
        assert_eq!(
            grammar.compile_drop_all_tables(&["users".to_string(), "posts".to_string()]),
            vec![
                "pragma foreign_keys = off; drop table if exists \"users\"; \
                 drop table if exists \"posts\"; pragma foreign_keys = on"
            ]
        );
        assert!(grammar.compile_drop_all_tables(&[]).is_empty());
    }

    #[test]
    fn test_json_contains() {
        let grammar = SqliteGrammar::new();

        let single = grammar.compile_json_contains("data->array", &json!("abc"), false).unwrap();
        assert_eq!(
            single.sql,
            "exists (select 1 from json_each(\"data\", '$.\"array\"') where \"json_each\".\"value\" is ?)"
        );
        assert_eq!(single.bindings, vec![DatabaseValue::from("abc")]);

        let many = grammar.compile_json_contains("tags", &json!([1, 2]), true).unwrap();
        assert_eq!(
            many.sql,
            "not (exists (select 1 from json_each(\"tags\") where \"json_each\".\"value\" is ?) \
             and exists (select 1 from json_each(\"tags\") where \"json_each\".\"value\" is ?))"
        );
        assert_eq!(many.bindings, vec![DatabaseValue::Int(1), DatabaseValue::Int(2)]);

        assert!(grammar.compile_json_contains("data->a", &json!({"k": 1}), false).is_err());
    }

    #[test]
    fn test_json_key_length_and_selector() {
        let grammar = SqliteGrammar::new();
        assert_eq!(
            grammar.compile_json_contains_key("data->a[1]", true).unwrap(),
            "not json_type(\"data\", '$.\"a\"[1]') is not null"
        );
        assert_eq!(
            grammar.compile_json_length("data->tags", "<", 3).unwrap().sql,
            "json_array_length(\"data\", '$.\"tags\"') < ?"
        );
        let path = JsonPath::parse("data->name").unwrap();
        assert_eq!(grammar.compile_json_selector(&path), "json_extract(\"data\", '$.\"name\"')");
    }

    #[test]
    fn test_json_columns_update() {
        let grammar = SqliteGrammar::new();
        let update = grammar
            .compile_json_columns_update(&[
                ("data->name".to_string(), json!("krishan")),
                ("data->address->city".to_string(), json!("Colombo")),
            ])
            .unwrap();

        assert_eq!(
            update.sql,
            "\"data\" = json_set(\"data\", '$.\"name\"', json(?), '$.\"address\".\"city\"', json(?))"
        );
        assert_eq!(
            update.bindings,
            vec![DatabaseValue::from("\"krishan\""), DatabaseValue::from("\"Colombo\"")]
        );
    }
}
