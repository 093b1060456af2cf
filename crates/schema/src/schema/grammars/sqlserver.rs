//! SQL Server grammar

use serde_json::Value as JsonValue;

use super::{command_column, required, Grammar, LockClause, PlaceholderStyle};
use crate::backends::{DatabaseValue, Dialect};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::blueprint::Blueprint;
use crate::schema::column::ColumnDefinition;
use crate::schema::command::{Command, CommandKind};
use crate::schema::json::{contained_scalars, group_updates, CompiledSql, JsonPath, JsonSegment};

#[derive(Debug, Clone, Default)]
pub struct SqlServerGrammar;

impl SqlServerGrammar {
    pub fn new() -> Self {
        Self
    }

    fn unsupported(&self, what: &str) -> SchemaError {
        SchemaError::unsupported(Dialect::SqlServer, what)
    }

    fn modifiers(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        let mut sql = String::new();

        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" collate {}", collation));
        }
        sql.push_str(if column.nullable { " null" } else { " not null" });
        if !column.change {
            if column.use_current {
                sql.push_str(" default CURRENT_TIMESTAMP");
            } else if let Some(default) = &column.default {
                sql.push_str(&format!(" default {}", self.get_default_value(default)));
            }
        }
        if !column.change && column.auto_increment && column.column_type.is_integer() {
            if blueprint.has_command(CommandKind::Primary) {
                sql.push_str(" identity");
            } else {
                sql.push_str(" identity primary key");
            }
        }

        sql
    }

    /// Dynamic SQL dropping the default constraints bound to `columns`
    fn compile_drop_default_constraint(&self, blueprint: &Blueprint, columns: &[String]) -> String {
        let table = self.wrap_table(blueprint);
        format!(
            "DECLARE @sql NVARCHAR(MAX) = '';\
             SELECT @sql += 'ALTER TABLE {table} DROP CONSTRAINT ' + OBJECT_NAME([default_object_id]) + ';' \
             FROM sys.columns \
             WHERE [object_id] = OBJECT_ID({table_name}) AND [name] in ({columns}) AND [default_object_id] <> 0;\
             EXEC(@sql)",
            table = table,
            table_name = self.quote_string(&table),
            columns = self.quote_strings(columns)
        )
    }

    fn with_precision(name: &str, fallback: &str, column: &ColumnDefinition) -> String {
        match column.precision {
            Some(precision) => format!("{}({})", name, precision),
            None => fallback.to_string(),
        }
    }

    fn json_field_and_path(&self, path: &JsonPath) -> String {
        let field = self.wrap(&path.column);
        if path.has_path() {
            format!("{}, {}", field, self.quote_string(&path.to_json_path()))
        } else {
            field
        }
    }
}

impl Grammar for SqlServerGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    /// Unicode string literal
    fn quote_string(&self, value: &str) -> String {
        format!("N'{}'", value.replace('\'', "''"))
    }

    fn get_column(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        format!(
            "{} {}{}",
            self.wrap(&column.name),
            self.get_type(column),
            self.modifiers(blueprint, column)
        )
    }

    fn compile_create(&self, blueprint: &Blueprint) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "create table {} ({})",
            self.wrap_table(blueprint),
            self.get_columns(blueprint).join(", ")
        )])
    }

    fn compile_add(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        Ok(vec![format!(
            "alter table {} add {}",
            self.wrap_table(blueprint),
            self.get_column(blueprint, column)
        )])
    }

    /// Drop the old default, redefine the column, then restore a default
    fn compile_change(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        let mut statements = vec![
            self.compile_drop_default_constraint(blueprint, &[column.name.clone()]),
            format!(
                "alter table {} alter column {}",
                self.wrap_table(blueprint),
                self.get_column(blueprint, column)
            ),
        ];

        let default = if column.use_current {
            Some("CURRENT_TIMESTAMP".to_string())
        } else {
            column.default.as_ref().map(|default| self.get_default_value(default))
        };
        if let Some(default) = default {
            statements.push(format!(
                "alter table {} add default {} for {}",
                self.wrap_table(blueprint),
                default,
                self.wrap(&column.name)
            ));
        }

        Ok(statements)
    }

    fn compile_drop_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![
            self.compile_drop_default_constraint(blueprint, &command.columns),
            format!(
                "alter table {} drop column {}",
                self.wrap_table(blueprint),
                self.columnize(&command.columns)
            ),
        ])
    }

    fn compile_rename(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let to = required(&command.to, "new table name")?;
        let to = to.rsplit('.').next().unwrap_or(to);
        Ok(vec![format!(
            "sp_rename {}, {}",
            self.quote_string(&self.wrap_table(blueprint)),
            self.wrap_value(&format!("{}{}", blueprint.get_prefix(), to))
        )])
    }

    fn compile_rename_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let from = format!(
            "{}.{}",
            self.wrap_table(blueprint),
            self.wrap(required(&command.from, "column to rename")?)
        );
        Ok(vec![format!(
            "sp_rename {}, {}, N'COLUMN'",
            self.quote_string(&from),
            self.wrap(required(&command.to, "new column name")?)
        )])
    }

    fn compile_comment(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn compile_table_comment(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn compile_drop_if_exists(&self, blueprint: &Blueprint) -> String {
        let table = self.wrap_table(blueprint);
        format!(
            "if object_id({}, 'U') is not null drop table {}",
            self.quote_string(&table),
            table
        )
    }

    /// Foreign keys go first so tables can be dropped in any order
    fn compile_drop_all_tables(&self, tables: &[String]) -> Vec<String> {
        if tables.is_empty() {
            return Vec::new();
        }
        let drop_foreign_keys = "DECLARE @sql NVARCHAR(MAX) = N'';\
             SELECT @sql += 'ALTER TABLE ' \
             + QUOTENAME(OBJECT_SCHEMA_NAME(parent_object_id)) + '.' + QUOTENAME(OBJECT_NAME(parent_object_id)) \
             + ' DROP CONSTRAINT ' + QUOTENAME(name) + ';' \
             FROM sys.foreign_keys;\
             EXEC sp_executesql @sql;"
            .to_string();
        let tables = tables.iter().map(|table| self.wrap(table)).collect::<Vec<_>>().join(", ");
        vec![drop_foreign_keys, format!("drop table {}", tables)]
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Vec<String> {
        if views.is_empty() {
            return Vec::new();
        }
        let views = views.iter().map(|view| self.wrap(view)).collect::<Vec<_>>().join(", ");
        vec![format!("drop view {}", views)]
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

    fn compile_primary(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} add constraint {} primary key ({})",
            self.wrap_table(blueprint),
            self.wrap_value(command.index_name()),
            self.columnize(&command.columns)
        )])
    }

    fn compile_drop_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "drop index {} on {}",
            self.wrap_value(command.index_name()),
            self.wrap_table(blueprint)
        )])
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        self.compile_drop_index(blueprint, command)
    }

    fn compile_drop_fulltext(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Err(self.unsupported("fulltext indexes"))
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        self.compile_drop_foreign(blueprint, command)
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} drop constraint {}",
            self.wrap_table(blueprint),
            self.wrap_value(command.index_name())
        )])
    }

    fn type_big_integer(&self, _column: &ColumnDefinition) -> String {
        "bigint".to_string()
    }

    fn type_binary(&self, _column: &ColumnDefinition) -> String {
        "varbinary(max)".to_string()
    }

    fn type_boolean(&self, _column: &ColumnDefinition) -> String {
        "bit".to_string()
    }

    fn type_char(&self, column: &ColumnDefinition) -> String {
        format!("nchar({})", column.string_length())
    }

    fn type_date(&self, _column: &ColumnDefinition) -> String {
        "date".to_string()
    }

    fn type_date_time(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("datetime2", "datetime", column)
    }

    fn type_date_time_tz(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("datetimeoffset", "datetimeoffset", column)
    }

    fn type_decimal(&self, column: &ColumnDefinition) -> String {
        format!("decimal({}, {})", column.total.unwrap_or(8), column.places.unwrap_or(2))
    }

    fn type_double(&self, _column: &ColumnDefinition) -> String {
        "double precision".to_string()
    }

    fn type_enum(&self, column: &ColumnDefinition) -> String {
        format!(
            "nvarchar(255) check ({} in ({}))",
            self.wrap(&column.name),
            self.quote_strings(&column.allowed)
        )
    }

    fn type_float(&self, column: &ColumnDefinition) -> String {
        match column.precision {
            Some(precision) => format!("float({})", precision),
            None => "float".to_string(),
        }
    }

    fn type_integer(&self, _column: &ColumnDefinition) -> String {
        "int".to_string()
    }

    fn type_json(&self, _column: &ColumnDefinition) -> String {
        "nvarchar(max)".to_string()
    }

    fn type_jsonb(&self, _column: &ColumnDefinition) -> String {
        "nvarchar(max)".to_string()
    }

    fn type_long_text(&self, _column: &ColumnDefinition) -> String {
        "nvarchar(max)".to_string()
    }

    fn type_medium_integer(&self, _column: &ColumnDefinition) -> String {
        "int".to_string()
    }

    fn type_medium_text(&self, _column: &ColumnDefinition) -> String {
        "nvarchar(max)".to_string()
    }

    fn type_small_integer(&self, _column: &ColumnDefinition) -> String {
        "smallint".to_string()
    }

    /// `nvarchar(N)` stores UTF-16, so the catalog reports twice N bytes
    fn type_string(&self, column: &ColumnDefinition) -> String {
        format!("nvarchar({})", column.string_length())
    }

    fn type_text(&self, _column: &ColumnDefinition) -> String {
        "nvarchar(max)".to_string()
    }

    fn type_time(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("time", "time", column)
    }

    fn type_time_tz(&self, column: &ColumnDefinition) -> String {
        self.type_time(column)
    }

    fn type_timestamp(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("datetime2", "datetime", column)
    }

    fn type_timestamp_tz(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("datetimeoffset", "datetimeoffset", column)
    }

    fn type_tiny_integer(&self, _column: &ColumnDefinition) -> String {
        "tinyint".to_string()
    }

    fn type_tiny_text(&self, _column: &ColumnDefinition) -> String {
        "nvarchar(255)".to_string()
    }

    fn type_uuid(&self, _column: &ColumnDefinition) -> String {
        "uniqueidentifier".to_string()
    }

    fn compile_tables(&self, _database: &str) -> String {
        "select t.name as name, schema_name(t.schema_id) as [schema], \
         cast(sum(u.total_pages) * 8 * 1024 as bigint) as size \
         from sys.tables as t \
         join sys.partitions as p on p.object_id = t.object_id \
         join sys.allocation_units as u on u.container_id = p.hobt_id \
         group by t.name, t.schema_id \
         order by t.name"
            .to_string()
    }

    fn compile_views(&self, _database: &str) -> String {
        "select name, schema_name(v.schema_id) as [schema], definition \
         from sys.views as v inner join sys.sql_modules as m on v.object_id = m.object_id \
         order by name"
            .to_string()
    }

    fn compile_columns(&self, schema: &str, table: &str) -> String {
        format!(
            "select col.name, type.name as type_name, col.max_length as length, col.precision as precision, \
             col.scale as places, col.is_nullable as nullable, def.definition as [default], \
             col.is_identity as autoincrement, col.collation_name as collation, \
             cast(prop.value as nvarchar(max)) as comment \
             from sys.columns as col \
             join sys.types as type on col.user_type_id = type.user_type_id \
             join sys.objects as obj on col.object_id = obj.object_id \
             join sys.schemas as scm on obj.schema_id = scm.schema_id \
             left join sys.default_constraints def on col.default_object_id = def.object_id and col.object_id = def.parent_object_id \
             left join sys.extended_properties as prop on obj.object_id = prop.major_id and col.column_id = prop.minor_id and prop.name = 'MS_Description' \
             where obj.type in ('U', 'V') and obj.name = {} and scm.name = {} \
             order by col.column_id",
            self.quote_string(table),
            self.quote_string(schema)
        )
    }

    fn compile_indexes(&self, schema: &str, table: &str) -> String {
        format!(
            "select idx.name as name, string_agg(col.name, ',') within group (order by idxcol.key_ordinal) as columns, \
             idx.type_desc as [type], idx.is_unique as [unique], idx.is_primary_key as [primary] \
             from sys.indexes as idx \
             join sys.tables as tbl on idx.object_id = tbl.object_id \
             join sys.schemas as scm on tbl.schema_id = scm.schema_id \
             join sys.index_columns as idxcol on idx.object_id = idxcol.object_id and idx.index_id = idxcol.index_id \
             join sys.columns as col on idxcol.object_id = col.object_id and idxcol.column_id = col.column_id \
             where tbl.name = {} and scm.name = {} \
             group by idx.name, idx.type_desc, idx.is_unique, idx.is_primary_key",
            self.quote_string(table),
            self.quote_string(schema)
        )
    }

    fn compile_foreign_keys(&self, schema: &str, table: &str) -> String {
        format!(
            "select fk.name as name, \
             string_agg(lc.name, ',') within group (order by fkc.constraint_column_id) as columns, \
             fs.name as foreign_schema, ft.name as foreign_table, \
             string_agg(fc.name, ',') within group (order by fkc.constraint_column_id) as foreign_columns, \
             fk.update_referential_action_desc as on_update, fk.delete_referential_action_desc as on_delete \
             from sys.foreign_keys as fk \
             join sys.foreign_key_columns as fkc on fkc.constraint_object_id = fk.object_id \
             join sys.tables as lt on lt.object_id = fk.parent_object_id \
             join sys.schemas as ls on lt.schema_id = ls.schema_id \
             join sys.columns as lc on fkc.parent_object_id = lc.object_id and fkc.parent_column_id = lc.column_id \
             join sys.tables as ft on ft.object_id = fk.referenced_object_id \
             join sys.schemas as fs on ft.schema_id = fs.schema_id \
             join sys.columns as fc on fkc.referenced_object_id = fc.object_id and fkc.referenced_column_id = fc.column_id \
             where lt.name = {} and ls.name = {} \
             group by fk.name, fs.name, ft.name, fk.update_referential_action_desc, fk.delete_referential_action_desc",
            self.quote_string(table),
            self.quote_string(schema)
        )
    }

    fn compile_json_selector(&self, path: &JsonPath) -> String {
        if !path.has_path() {
            return self.wrap(&path.column);
        }
        format!("json_value({})", self.json_field_and_path(path))
    }

    fn compile_json_contains(&self, selector: &str, value: &JsonValue, not: bool) -> SchemaResult<CompiledSql> {
        let path = JsonPath::parse(selector)?;
        let source = self.json_field_and_path(&path);
        let bindings = contained_scalars(value, "sqlserver json containment")?
            .into_iter()
            .map(|binding| match binding {
                DatabaseValue::Bool(b) => DatabaseValue::String(b.to_string()),
                other => other,
            })
            .collect::<Vec<_>>();

        let sql = if bindings.is_empty() {
            "1 = 1".to_string()
        } else {
            bindings
                .iter()
                .map(|_| format!("? in (select [value] from openjson({}))", source))
                .collect::<Vec<_>>()
                .join(" and ")
        };

        let sql = if not { format!("not ({})", sql) } else { sql };
        Ok(CompiledSql::new(sql, bindings))
    }

    fn compile_json_contains_key(&self, selector: &str, not: bool) -> SchemaResult<String> {
        let path = JsonPath::parse(selector)?;
        let (parent, last) = path.split_last();
        let key = match last {
            Some(JsonSegment::Index(index)) => index.to_string(),
            Some(JsonSegment::Field(field)) => self.quote_string(&field),
            None => {
                return Err(SchemaError::compilation(format!("'{}' does not name a json key", selector)))
            }
        };
        let sql = format!(
            "{} in (select [key] from openjson({}))",
            key,
            self.json_field_and_path(&parent)
        );
        Ok(if not { format!("not {}", sql) } else { sql })
    }

    fn compile_json_length_expression(&self, path: &JsonPath) -> String {
        format!("(select count(*) from openjson({}))", self.json_field_and_path(path))
    }

    fn compile_json_columns_update(&self, values: &[(String, JsonValue)]) -> SchemaResult<CompiledSql> {
        let mut clauses = Vec::new();
        let mut bindings = Vec::new();

        for (column, paths) in group_updates(values)? {
            let field = self.wrap(&column);
            let mut expression = field.clone();
            for (path, value) in paths {
                let placeholder = match &value {
                    JsonValue::Bool(b) => format!("cast({} as bit)", u8::from(*b)),
                    JsonValue::Array(_) | JsonValue::Object(_) => {
                        bindings.push(DatabaseValue::String(value.to_string()));
                        "json_query(?)".to_string()
                    }
                    scalar => {
                        bindings.push(DatabaseValue::from_json(scalar));
                        "?".to_string()
                    }
                };
                expression = format!(
                    "json_modify({}, {}, {})",
                    expression,
                    self.quote_string(&path.to_json_path()),
                    placeholder
                );
            }
            clauses.push(format!("{} = {}", field, expression));
        }

        Ok(CompiledSql::new(clauses.join(", "), bindings))
    }

    fn compile_lock_for_update(&self) -> LockClause {
        LockClause::table_hint("with(rowlock,updlock,holdlock)")
    }

    fn compile_shared_lock(&self) -> LockClause {
        LockClause::table_hint("with(rowlock,holdlock)")
    }

    fn compile_random(&self, _seed: Option<&str>) -> String {
        "newid()".to_string()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::AtP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::grammars::LockPosition;
    use serde_json::json;

    #[test]
    fn test_compile_create() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.create();
        blueprint.id();
        blueprint.string("name", None);
        blueprint.enumeration("role", &["admin", "user"]).default("user");
        blueprint.json("settings").nullable();
        blueprint.timestamp("created_at", Some(3)).use_current();

        let sql = blueprint.to_sql(&SqlServerGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table \"users\" (\"id\" bigint not null identity primary key, \
                 \"name\" nvarchar(255) not null, \
                 \"role\" nvarchar(255) check (\"role\" in (N'admin', N'user')) not null default N'user', \
                 \"settings\" nvarchar(max) null, \
                 \"created_at\" datetime2(3) not null default CURRENT_TIMESTAMP)"
            ]
        );
    }

    #[test]
    fn test_compile_change_restores_default() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.string("name", Some(100)).default("guest").change();

        let sql = blueprint.to_sql(&SqlServerGrammar::new()).unwrap();
        assert_eq!(sql.len(), 3);
        assert!(sql[0].starts_with("DECLARE @sql NVARCHAR(MAX) = '';"));
        assert!(sql[0].contains("OBJECT_ID(N'\"users\"') AND [name] in (N'name')"));
        assert_eq!(sql[1], "alter table \"users\" alter column \"name\" nvarchar(100) not null");
        assert_eq!(sql[2], "alter table \"users\" add default N'guest' for \"name\"");
    }

    #[test]
    fn test_renames_and_drops() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.rename_column("name", "full_name");
        blueprint.drop_column(&["age", "bio"]);
        blueprint.drop_index("users_email_index");
        blueprint.drop_primary().name("users_pk");
        blueprint.rename("people");

        let sql = blueprint.to_sql(&SqlServerGrammar::new()).unwrap();
        assert_eq!(sql[0], "sp_rename N'\"users\".\"name\"', \"full_name\", N'COLUMN'");
        assert!(sql[1].contains("[name] in (N'age', N'bio')"));
        assert_eq!(sql[2], "alter table \"users\" drop column \"age\", \"bio\"");
        assert_eq!(sql[3], "drop index \"users_email_index\" on \"users\"");
        assert_eq!(sql[4], "alter table \"users\" drop constraint \"users_pk\"");
        assert_eq!(sql[5], "sp_rename N'\"users\"', \"people\"");
    }

    #[test]
    fn test_drop_if_exists() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.drop_if_exists();
        assert_eq!(
            blueprint.to_sql(&SqlServerGrammar::new()).unwrap(),
            vec!["if object_id(N'\"users\"', 'U') is not null drop table \"users\""]
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.comment("accounts");
        assert!(blueprint.to_sql(&SqlServerGrammar::new()).unwrap().is_empty());
    }

    #[test]
    fn test_json_predicates() {
        let grammar = SqlServerGrammar::new();

        let contains = grammar.compile_json_contains("data->array", &json!(["abc", true]), false).unwrap();
        assert_eq!(
            contains.sql,
            "? in (select [value] from openjson(\"data\", N'$.\"array\"')) \
             and ? in (select [value] from openjson(\"data\", N'$.\"array\"'))"
        );
        assert_eq!(contains.bindings, vec![DatabaseValue::from("abc"), DatabaseValue::from("true")]);

        assert_eq!(
            grammar.compile_json_contains_key("data->items[1]", false).unwrap(),
            "1 in (select [key] from openjson(\"data\", N'$.\"items\"'))"
        );
        assert_eq!(
            grammar.compile_json_contains_key("data->name", true).unwrap(),
            "not N'name' in (select [key] from openjson(\"data\"))"
        );

        let length = grammar.compile_json_length("data->tags", "=", 0).unwrap();
        assert_eq!(
            grammar.prepare_placeholders(&length.sql),
            "(select count(*) from openjson(\"data\", N'$.\"tags\"')) = @p1"
        );
    }

    #[test]
    fn test_json_columns_update_nests_json_modify() {
        let grammar = SqlServerGrammar::new();
        let update = grammar
            .compile_json_columns_update(&[
                ("data->name".to_string(), json!("krishan")),
                ("data->tags".to_string(), json!(["a"])),
                ("data->active".to_string(), json!(true)),
            ])
            .unwrap();

        assert_eq!(
            update.sql,
            "\"data\" = json_modify(json_modify(json_modify(\"data\", N'$.\"name\"', ?), \
             N'$.\"tags\"', json_query(?)), N'$.\"active\"', cast(1 as bit))"
        );
        assert_eq!(
            update.bindings,
            vec![DatabaseValue::from("krishan"), DatabaseValue::from("[\"a\"]")]
        );
    }

    #[test]
    fn test_query_clauses() {
        let grammar = SqlServerGrammar::new();
        let lock = grammar.compile_lock_for_update();
        assert_eq!(lock.position, LockPosition::TableHint);
        assert_eq!(lock.sql, "with(rowlock,updlock,holdlock)");
        assert_eq!(grammar.compile_random(None), "newid()");
        assert!(matches!(
            grammar.compile_fulltext(&Blueprint::new("t", ""), &Command::new(CommandKind::Fulltext)),
            Err(SchemaError::Unsupported { .. })
        ));
    }
}
