//! MySQL grammar

use serde_json::Value as JsonValue;

use super::{command_column, required, Grammar, LockClause};
use crate::backends::{DatabaseValue, Dialect};
use crate::config::ConnectionConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::blueprint::Blueprint;
use crate::schema::column::ColumnDefinition;
use crate::schema::command::{Command, CommandKind};
use crate::schema::json::{group_updates, CompiledSql, JsonPath};

/// MySQL / MariaDB grammar
#[derive(Debug, Clone, Default)]
pub struct MySqlGrammar {
    charset: Option<String>,
    collation: Option<String>,
    engine: Option<String>,
}

impl MySqlGrammar {
    /// Create a grammar using the connection's table options
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            charset: config.charset.clone(),
            collation: config.collation.clone(),
            engine: config.engine.clone(),
        }
    }

    fn current_timestamp(column: &ColumnDefinition) -> String {
        match column.precision {
            Some(precision) if precision > 0 => format!("CURRENT_TIMESTAMP({})", precision),
            _ => "CURRENT_TIMESTAMP".to_string(),
        }
    }

    fn with_precision(name: &str, column: &ColumnDefinition) -> String {
        match column.precision {
            Some(precision) if precision > 0 => format!("{}({})", name, precision),
            _ => name.to_string(),
        }
    }

    fn modifiers(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        let mut sql = String::new();

        if column.unsigned {
            sql.push_str(" unsigned");
        }
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" collate '{}'", collation));
        }
        sql.push_str(if column.nullable { " null" } else { " not null" });

        if column.use_current {
            sql.push_str(&format!(" default {}", Self::current_timestamp(column)));
        } else if let Some(default) = &column.default {
            sql.push_str(&format!(" default {}", self.get_default_value(default)));
        }
        if column.use_current_on_update {
            sql.push_str(&format!(" on update {}", Self::current_timestamp(column)));
        }

        if column.auto_increment && column.column_type.is_integer() {
            if blueprint.has_command(CommandKind::Primary) || (column.change && !column.primary) {
                sql.push_str(" auto_increment");
            } else {
                sql.push_str(" auto_increment primary key");
            }
        }

        if let Some(comment) = &column.comment {
            sql.push_str(&format!(" comment {}", self.quote_string(comment)));
        }

        if !blueprint.is_creating() {
            if let Some(after) = &column.after {
                sql.push_str(&format!(" after {}", self.wrap(after)));
            } else if column.first {
                sql.push_str(" first");
            }
        }

        sql
    }

    fn compile_key(&self, blueprint: &Blueprint, command: &Command, kind: &str) -> Vec<String> {
        vec![format!(
            "alter table {} add {} {}{}({})",
            self.wrap_table(blueprint),
            kind,
            self.wrap(command.index_name()),
            command
                .algorithm
                .as_ref()
                .map(|algorithm| format!(" using {}", algorithm))
                .unwrap_or_default(),
            self.columnize(&command.columns)
        )]
    }

    fn compile_drop_key(&self, blueprint: &Blueprint, command: &Command) -> Vec<String> {
        vec![format!(
            "alter table {} drop index {}",
            self.wrap_table(blueprint),
            self.wrap(command.index_name())
        )]
    }

    /// `(field, ", 'path'")` pair used by json functions
    fn json_field_and_path(&self, path: &JsonPath) -> (String, String) {
        let field = self.wrap(&path.column);
        if path.has_path() {
            (field, format!(", {}", self.quote_string(&path.to_json_path())))
        } else {
            (field, String::new())
        }
    }
}

impl Grammar for MySqlGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
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
        let mut structure = self.get_columns(blueprint);
        if let Some(primary) = blueprint.commands_of(CommandKind::Primary).next() {
            structure.push(format!(
                "primary key {}({})",
                primary
                    .algorithm
                    .as_ref()
                    .map(|algorithm| format!("using {}", algorithm))
                    .unwrap_or_default(),
                self.columnize(&primary.columns)
            ));
        }

        let mut sql = format!(
            "create table {} ({})",
            self.wrap_table(blueprint),
            structure.join(", ")
        );

        if let Some(charset) = blueprint.charset.as_ref().or(self.charset.as_ref()) {
            sql.push_str(&format!(" default character set {}", charset));
        }
        if let Some(collation) = blueprint.collation.as_ref().or(self.collation.as_ref()) {
            sql.push_str(&format!(" collate '{}'", collation));
        }
        if let Some(engine) = blueprint.engine.as_ref().or(self.engine.as_ref()) {
            sql.push_str(&format!(" engine = {}", engine));
        }

        Ok(vec![sql])
    }

    fn compile_add(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        Ok(vec![format!(
            "alter table {} add {}",
            self.wrap_table(blueprint),
            self.get_column(blueprint, column)
        )])
    }

    /// MySQL redefines the whole column in one `modify`
    fn compile_change(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        Ok(vec![format!(
            "alter table {} modify {}",
            self.wrap_table(blueprint),
            self.get_column(blueprint, column)
        )])
    }

    fn compile_drop_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let columns = command
            .columns
            .iter()
            .map(|column| format!("drop {}", self.wrap(column)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(vec![format!("alter table {} {}", self.wrap_table(blueprint), columns)])
    }

    fn compile_rename(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let to = required(&command.to, "new table name")?;
        Ok(vec![format!(
            "rename table {} to {}",
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

    /// Column comments are inlined by the column modifiers
    fn compile_comment(&self, _blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn compile_table_comment(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let comment = required(&command.value, "comment")?;
        Ok(vec![format!(
            "alter table {} comment = {}",
            self.wrap_table(blueprint),
            self.quote_string(comment)
        )])
    }

    fn compile_drop_all_tables(&self, tables: &[String]) -> Vec<String> {
        if tables.is_empty() {
            return Vec::new();
        }
        let tables = tables.iter().map(|table| self.wrap(table)).collect::<Vec<_>>().join(", ");
        vec![format!(
            "set foreign_key_checks=0; drop table {}; set foreign_key_checks=1",
            tables
        )]
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Vec<String> {
        if views.is_empty() {
            return Vec::new();
        }
        let views = views.iter().map(|view| self.wrap(view)).collect::<Vec<_>>().join(", ");
        vec![format!("drop view {}", views)]
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.compile_key(blueprint, command, "index"))
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.compile_key(blueprint, command, "unique"))
    }

    fn compile_fulltext(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.compile_key(blueprint, command, "fulltext"))
    }

    /// Inlined into `create table` when creating
    fn compile_primary(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        if blueprint.is_creating() {
            return Ok(Vec::new());
        }
        Ok(vec![format!(
            "alter table {} add primary key {}({})",
            self.wrap_table(blueprint),
            command
                .algorithm
                .as_ref()
                .map(|algorithm| format!("using {}", algorithm))
                .unwrap_or_default(),
            self.columnize(&command.columns)
        )])
    }

    fn compile_drop_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, command))
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, command))
    }

    fn compile_drop_fulltext(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.compile_drop_key(blueprint, command))
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!("alter table {} drop primary key", self.wrap_table(blueprint))])
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} drop foreign key {}",
            self.wrap_table(blueprint),
            self.wrap(command.index_name())
        )])
    }

    fn type_big_integer(&self, _column: &ColumnDefinition) -> String {
        "bigint".to_string()
    }

    fn type_binary(&self, _column: &ColumnDefinition) -> String {
        "blob".to_string()
    }

    fn type_boolean(&self, _column: &ColumnDefinition) -> String {
        "tinyint(1)".to_string()
    }

    fn type_char(&self, column: &ColumnDefinition) -> String {
        format!("char({})", column.string_length())
    }

    fn type_date(&self, _column: &ColumnDefinition) -> String {
        "date".to_string()
    }

    fn type_date_time(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("datetime", column)
    }

    fn type_date_time_tz(&self, column: &ColumnDefinition) -> String {
        self.type_date_time(column)
    }

    fn type_decimal(&self, column: &ColumnDefinition) -> String {
        format!("decimal({}, {})", column.total.unwrap_or(8), column.places.unwrap_or(2))
    }

    fn type_double(&self, _column: &ColumnDefinition) -> String {
        "double".to_string()
    }

    fn type_enum(&self, column: &ColumnDefinition) -> String {
        format!("enum({})", self.quote_strings(&column.allowed))
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
        "json".to_string()
    }

    fn type_jsonb(&self, _column: &ColumnDefinition) -> String {
        "json".to_string()
    }

    fn type_long_text(&self, _column: &ColumnDefinition) -> String {
        "longtext".to_string()
    }

    fn type_medium_integer(&self, _column: &ColumnDefinition) -> String {
        "mediumint".to_string()
    }

    fn type_medium_text(&self, _column: &ColumnDefinition) -> String {
        "mediumtext".to_string()
    }

    fn type_small_integer(&self, _column: &ColumnDefinition) -> String {
        "smallint".to_string()
    }

    fn type_string(&self, column: &ColumnDefinition) -> String {
        format!("varchar({})", column.string_length())
    }

    fn type_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_time(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("time", column)
    }

    fn type_time_tz(&self, column: &ColumnDefinition) -> String {
        self.type_time(column)
    }

    fn type_timestamp(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("timestamp", column)
    }

    fn type_timestamp_tz(&self, column: &ColumnDefinition) -> String {
        self.type_timestamp(column)
    }

    fn type_tiny_integer(&self, _column: &ColumnDefinition) -> String {
        "tinyint".to_string()
    }

    fn type_tiny_text(&self, _column: &ColumnDefinition) -> String {
        "tinytext".to_string()
    }

    fn type_uuid(&self, _column: &ColumnDefinition) -> String {
        "char(36)".to_string()
    }

    fn compile_tables(&self, database: &str) -> String {
        format!(
            "select table_name as `name`, table_schema as `schema`, \
             cast(data_length + index_length as signed) as `size`, table_comment as `comment`, \
             engine as `engine`, table_collation as `collation` \
             from information_schema.tables \
             where table_type in ('BASE TABLE', 'SYSTEM VERSIONED') and table_schema = {} \
             order by table_name",
            self.quote_string(database)
        )
    }

    fn compile_views(&self, database: &str) -> String {
        format!(
            "select table_name as `name`, table_schema as `schema`, view_definition as `definition` \
             from information_schema.views where table_schema = {} order by table_name",
            self.quote_string(database)
        )
    }

    fn compile_columns(&self, schema: &str, table: &str) -> String {
        format!(
            "select column_name as `name`, data_type as `type_name`, column_type as `type`, \
             collation_name as `collation`, is_nullable as `nullable`, column_default as `default`, \
             column_comment as `comment`, extra as `extra` \
             from information_schema.columns where table_schema = {} and table_name = {} \
             order by ordinal_position asc",
            self.quote_string(schema),
            self.quote_string(table)
        )
    }

    fn compile_indexes(&self, schema: &str, table: &str) -> String {
        format!(
            "select index_name as `name`, group_concat(column_name order by seq_in_index) as `columns`, \
             index_type as `type`, not non_unique as `unique` \
             from information_schema.statistics where table_schema = {} and table_name = {} \
             group by index_name, index_type, non_unique",
            self.quote_string(schema),
            self.quote_string(table)
        )
    }

    fn compile_foreign_keys(&self, schema: &str, table: &str) -> String {
        format!(
            "select kc.constraint_name as `name`, \
             group_concat(kc.column_name order by kc.ordinal_position) as `columns`, \
             kc.referenced_table_schema as `foreign_schema`, kc.referenced_table_name as `foreign_table`, \
             group_concat(kc.referenced_column_name order by kc.ordinal_position) as `foreign_columns`, \
             rc.update_rule as `on_update`, rc.delete_rule as `on_delete` \
             from information_schema.key_column_usage kc join information_schema.referential_constraints rc \
             on kc.constraint_schema = rc.constraint_schema and kc.constraint_name = rc.constraint_name \
             where kc.table_schema = {} and kc.table_name = {} and kc.referenced_table_name is not null \
             group by kc.constraint_name, kc.referenced_table_schema, kc.referenced_table_name, \
             rc.update_rule, rc.delete_rule",
            self.quote_string(schema),
            self.quote_string(table)
        )
    }

    fn compile_json_selector(&self, path: &JsonPath) -> String {
        let (field, path) = self.json_field_and_path(path);
        format!("json_unquote(json_extract({}{}))", field, path)
    }

    fn compile_json_contains(&self, selector: &str, value: &JsonValue, not: bool) -> SchemaResult<CompiledSql> {
        let path = JsonPath::parse(selector)?;
        let (field, path) = self.json_field_and_path(&path);
        let sql = format!("json_contains({}, ?{})", field, path);
        Ok(CompiledSql::new(
            if not { format!("not {}", sql) } else { sql },
            vec![DatabaseValue::String(value.to_string())],
        ))
    }

    fn compile_json_contains_key(&self, selector: &str, not: bool) -> SchemaResult<String> {
        let path = JsonPath::parse(selector)?;
        if !path.has_path() {
            return Err(SchemaError::compilation(format!("'{}' does not name a json key", selector)));
        }
        let (field, path) = self.json_field_and_path(&path);
        let sql = format!("ifnull(json_contains_path({}, 'one'{}), 0)", field, path);
        Ok(if not { format!("not {}", sql) } else { sql })
    }

    fn compile_json_length_expression(&self, path: &JsonPath) -> String {
        let (field, path) = self.json_field_and_path(path);
        format!("json_length({}{})", field, path)
    }

    fn compile_json_columns_update(&self, values: &[(String, JsonValue)]) -> SchemaResult<CompiledSql> {
        let mut clauses = Vec::new();
        let mut bindings = Vec::new();

        for (column, paths) in group_updates(values)? {
            let field = self.wrap(&column);
            let mut arguments = Vec::new();
            for (path, value) in paths {
                let placeholder = match &value {
                    JsonValue::Bool(b) => b.to_string(),
                    JsonValue::Array(_) | JsonValue::Object(_) => {
                        bindings.push(DatabaseValue::String(value.to_string()));
                        "cast(? as json)".to_string()
                    }
                    scalar => {
                        bindings.push(DatabaseValue::from_json(scalar));
                        "?".to_string()
                    }
                };
                arguments.push(format!("{}, {}", self.quote_string(&path.to_json_path()), placeholder));
            }
            clauses.push(format!("{} = json_set({}, {})", field, field, arguments.join(", ")));
        }

        Ok(CompiledSql::new(clauses.join(", "), bindings))
    }

    fn compile_lock_for_update(&self) -> LockClause {
        LockClause::suffix("for update")
    }

    fn compile_shared_lock(&self) -> LockClause {
        LockClause::suffix("lock in share mode")
    }

    fn compile_random(&self, seed: Option<&str>) -> String {
        format!("rand({})", seed.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grammar() -> MySqlGrammar {
        let mut config = ConnectionConfig::new(Dialect::MySql, "mysql://root@localhost/shop");
        config.charset = Some("utf8mb4".into());
        config.collation = Some("utf8mb4_unicode_ci".into());
        config.engine = Some("InnoDB".into());
        MySqlGrammar::new(&config)
    }

    #[test]
    fn test_compile_create() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.create();
        blueprint.id();
        blueprint.string("name", None).comment("display name");
        blueprint.enumeration("role", &["admin", "user"]).default("user");
        blueprint.timestamp("created_at", None).use_current();

        let sql = blueprint.to_sql(&grammar()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table `users` (`id` bigint unsigned not null auto_increment primary key, \
                 `name` varchar(255) not null comment 'display name', \
                 `role` enum('admin', 'user') not null default 'user', \
                 `created_at` timestamp not null default CURRENT_TIMESTAMP) \
                 default character set utf8mb4 collate 'utf8mb4_unicode_ci' engine = InnoDB"
            ]
        );
    }

    #[test]
    fn test_compile_create_with_composite_primary() {
        let mut blueprint = Blueprint::new("role_user", "");
        blueprint.create();
        blueprint.unsigned_integer("role_id");
        blueprint.unsigned_integer("user_id");
        blueprint.primary(&["role_id", "user_id"]);

        let sql = blueprint.to_sql(&MySqlGrammar::default()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table `role_user` (`role_id` int unsigned not null, `user_id` int unsigned not null, \
                 primary key (`role_id`, `user_id`))"
            ]
        );
    }

    #[test]
    fn test_compile_alter() {
        let mut blueprint = Blueprint::new("users", "app_");
        blueprint.string("email", Some(100)).nullable().after("name");
        blueprint.boolean("active").default(true).first();
        blueprint.string("name", Some(50)).change();
        blueprint.drop_column(&["age", "bio"]);
        blueprint.rename_column("nick", "handle");
        blueprint.unique(&["email"]);
        blueprint.drop_index("app_users_name_index");
        blueprint.drop_primary();
        blueprint.comment("user accounts");

        let sql = blueprint.to_sql(&MySqlGrammar::default()).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table `app_users` add `email` varchar(100) null after `name`",
                "alter table `app_users` add `active` tinyint(1) not null default '1' first",
                "alter table `app_users` modify `name` varchar(50) not null",
                "alter table `app_users` drop `age`, drop `bio`",
                "alter table `app_users` rename column `nick` to `handle`",
                "alter table `app_users` add unique `app_users_email_unique`(`email`)",
                "alter table `app_users` drop index `app_users_name_index`",
                "alter table `app_users` drop primary key",
                "alter table `app_users` comment = 'user accounts'",
            ]
        );
    }

    #[test]
    fn test_compile_foreign() {
        let mut blueprint = Blueprint::new("posts", "");
        blueprint.foreign(&["user_id"]).references(&["id"]).on("users").cascade_on_delete();
        blueprint.foreign(&["team_id"]).references(&["id"]).on("teams");
        blueprint.drop_foreign("posts_author_id_foreign");

        let sql = blueprint.to_sql(&MySqlGrammar::default()).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table `posts` add constraint `posts_user_id_foreign` foreign key (`user_id`) \
                 references `users` (`id`) on delete cascade",
                "alter table `posts` add constraint `posts_team_id_foreign` foreign key (`team_id`) \
                 references `teams` (`id`)",
                "alter table `posts` drop foreign key `posts_author_id_foreign`",
            ]
        );
    }

    #[test]
    fn test_compile_rename_and_drop() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.rename("people");
        assert_eq!(
            blueprint.to_sql(&MySqlGrammar::default()).unwrap(),
            vec!["rename table `users` to `people`"]
        );

        let mut blueprint = Blueprint::new("users", "");
        blueprint.drop_if_exists();
        assert_eq!(
            blueprint.to_sql(&MySqlGrammar::default()).unwrap(),
            vec!["drop table if exists `users`"]
        );
    }

    #[test]
    fn test_use_current_with_precision() {
        let mut blueprint = Blueprint::new("events", "");
        blueprint.timestamp("updated_at", Some(3)).use_current().use_current_on_update();
        assert_eq!(
            blueprint.to_sql(&MySqlGrammar::default()).unwrap(),
            vec![
                "alter table `events` add `updated_at` timestamp(3) not null \
                 default CURRENT_TIMESTAMP(3) on update CURRENT_TIMESTAMP(3)"
            ]
        );
    }

    #[test]
    fn test_json_predicates() {
        let grammar = MySqlGrammar::default();
        let contains = grammar.compile_json_contains("data->array", &json!("abc"), false).unwrap();
        assert_eq!(contains.sql, "json_contains(`data`, ?, '$.\"array\"')");
        assert_eq!(contains.bindings, vec![DatabaseValue::from("\"abc\"")]);

        let key = grammar.compile_json_contains_key("data->a->b", true).unwrap();
        assert_eq!(key, "not ifnull(json_contains_path(`data`, 'one', '$.\"a\".\"b\"'), 0)");

        let length = grammar.compile_json_length("data->tags", ">", 2).unwrap();
        assert_eq!(length.sql, "json_length(`data`, '$.\"tags\"') > ?");

        let path = JsonPath::parse("data->objects[0]->level").unwrap();
        assert_eq!(
            grammar.compile_json_selector(&path),
            "json_unquote(json_extract(`data`, '$.\"objects\"[0].\"level\"'))"
        );
    }

    #[test]
    fn test_json_columns_update() {
        let grammar = MySqlGrammar::default();
        let update = grammar
            .compile_json_columns_update(&[
                ("data->name".to_string(), json!("krishan")),
                ("data->tags".to_string(), json!(["a", "b"])),
                ("data->active".to_string(), json!(true)),
            ])
            .unwrap();

        assert_eq!(
            update.sql,
            "`data` = json_set(`data`, '$.\"name\"', ?, '$.\"tags\"', cast(? as json), '$.\"active\"', true)"
        );
        assert_eq!(
            update.bindings,
            vec![DatabaseValue::from("krishan"), DatabaseValue::from("[\"a\",\"b\"]")]
        );
    }

    #[test]
    fn test_query_clauses() {
        let grammar = MySqlGrammar::default();
        assert_eq!(grammar.compile_random(None), "rand()");
        assert_eq!(grammar.compile_random(Some("7")), "rand(7)");
        assert_eq!(grammar.compile_shared_lock().sql, "lock in share mode");
        assert_eq!(grammar.prepare_placeholders("a = ? and b = ?"), "a = ? and b = ?");
    }
}
