//! PostgreSQL grammar

use serde_json::Value as JsonValue;

use super::{command_column, required, Grammar, LockClause, PlaceholderStyle};
use crate::backends::{DatabaseValue, Dialect};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::blueprint::Blueprint;
use crate::schema::column::ColumnDefinition;
use crate::schema::command::{Command, CommandKind};
use crate::schema::json::{group_updates, CompiledSql, JsonPath, JsonSegment};

#[derive(Debug, Clone, Default)]
pub struct PostgresGrammar;

impl PostgresGrammar {
    pub fn new() -> Self {
        Self
    }

    /// Serial types only apply to fresh auto-increment columns without identity
    fn uses_serial(column: &ColumnDefinition) -> bool {
        column.auto_increment && column.generated_as.is_none() && !column.change
    }

    fn with_precision(name: &str, suffix: &str, column: &ColumnDefinition) -> String {
        match column.precision {
            Some(precision) => format!("{}({}) {}", name, precision, suffix),
            None => format!("{} {}", name, suffix),
        }
    }

    fn default_clause(&self, column: &ColumnDefinition) -> Option<String> {
        if column.use_current {
            return Some("CURRENT_TIMESTAMP".to_string());
        }
        column.default.as_ref().map(|default| self.get_default_value(default))
    }

    fn identity_clause(column: &ColumnDefinition) -> Option<String> {
        let options = column.generated_as.as_ref()?;
        let mut sql = format!(
            " generated {} as identity",
            if column.always { "always" } else { "by default" }
        );
        if !options.is_empty() {
            sql.push_str(&format!(" ({})", options));
        }
        Some(sql)
    }

    fn modifiers(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        let mut sql = String::new();

        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" collate {}", self.wrap_value(collation)));
        }
        sql.push_str(if column.nullable { " null" } else { " not null" });
        if let Some(default) = self.default_clause(column) {
            sql.push_str(&format!(" default {}", default));
        }
        if let Some(identity) = Self::identity_clause(column) {
            sql.push_str(&identity);
        }
        if column.auto_increment
            && column.column_type.is_integer()
            && !blueprint.has_command(CommandKind::Primary)
        {
            sql.push_str(" primary key");
        }

        sql
    }

    fn deferrable_clause(command: &Command) -> String {
        let mut sql = String::new();
        if let Some(deferrable) = command.deferrable {
            sql.push_str(if deferrable { " deferrable" } else { " not deferrable" });
        }
        if command.deferrable == Some(true) {
            if let Some(immediate) = command.initially_immediate {
                sql.push_str(if immediate { " initially immediate" } else { " initially deferred" });
            }
        }
        sql
    }

    /// Index names live in the table's schema
    fn wrap_index(&self, blueprint: &Blueprint, command: &Command) -> String {
        match blueprint.get_schema() {
            Some(schema) => format!("{}.{}", self.wrap_value(schema), self.wrap_value(command.index_name())),
            None => self.wrap_value(command.index_name()),
        }
    }

    fn drop_constraint(&self, blueprint: &Blueprint, name: &str) -> Vec<String> {
        vec![format!(
            "alter table {} drop constraint {}",
            self.wrap_table(blueprint),
            self.wrap_value(name)
        )]
    }

    /// `"column"->'a'->0` with every segment kept as jsonb
    fn json_path_expression(&self, path: &JsonPath) -> String {
        let mut sql = self.wrap(&path.column);
        for segment in &path.segments {
            sql.push_str("->");
            sql.push_str(&self.json_segment(segment));
        }
        sql
    }

    fn json_segment(&self, segment: &JsonSegment) -> String {
        match segment {
            JsonSegment::Field(field) => self.quote_string(field),
            JsonSegment::Index(index) => index.to_string(),
        }
    }

    /// Text array literal used by `jsonb_set`, e.g. `'{"a",0}'`
    fn jsonb_set_path(&self, path: &JsonPath) -> String {
        let parts = path
            .segments
            .iter()
            .map(|segment| match segment {
                JsonSegment::Field(field) => format!("\"{}\"", field.replace('"', "\\\"")),
                JsonSegment::Index(index) => index.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",");
        self.quote_string(&format!("{{{}}}", parts))
    }
}

impl Grammar for PostgresGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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
            "alter table {} add column {}",
            self.wrap_table(blueprint),
            self.get_column(blueprint, column)
        )])
    }

    /// One statement per changed attribute: type, nullability, default, identity, comment
    fn compile_change(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        let table = self.wrap_table(blueprint);
        let name = self.wrap(&column.name);
        let alter = |clause: String| format!("alter table {} alter column {} {}", table, name, clause);

        let mut collate = String::new();
        if let Some(collation) = &column.collation {
            collate = format!(" collate {}", self.wrap_value(collation));
        }

        let mut statements = vec![alter(format!("type {}{}", self.get_type(column), collate))];
        statements.push(alter(
            if column.nullable { "drop not null" } else { "set not null" }.to_string(),
        ));
        statements.push(alter(match self.default_clause(column) {
            Some(default) => format!("set default {}", default),
            None => "drop default".to_string(),
        }));
        if let Some(identity) = Self::identity_clause(column) {
            statements.push(alter(format!("add{}", identity)));
        }
        statements.push(format!(
            "comment on column {}.{} is {}",
            table,
            name,
            column
                .comment
                .as_ref()
                .map(|comment| self.quote_string(comment))
                .unwrap_or_else(|| "NULL".to_string())
        ));

        Ok(statements)
    }

    fn compile_drop_column(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let columns = command
            .columns
            .iter()
            .map(|column| format!("drop column {}", self.wrap(column)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(vec![format!("alter table {} {}", self.wrap_table(blueprint), columns)])
    }

    fn compile_rename(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let to = required(&command.to, "new table name")?;
        let to = to.rsplit('.').next().unwrap_or(to);
        Ok(vec![format!(
            "alter table {} rename to {}",
            self.wrap_table(blueprint),
            self.wrap_value(&format!("{}{}", blueprint.get_prefix(), to))
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

    fn compile_comment(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let column = command_column(command)?;
        let Some(comment) = &column.comment else {
            return Ok(Vec::new());
        };
        Ok(vec![format!(
            "comment on column {}.{} is {}",
            self.wrap_table(blueprint),
            self.wrap(&column.name),
            self.quote_string(comment)
        )])
    }

    fn compile_table_comment(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let comment = required(&command.value, "comment")?;
        Ok(vec![format!(
            "comment on table {} is {}",
            self.wrap_table(blueprint),
            self.quote_string(comment)
        )])
    }

    fn compile_drop_all_tables(&self, tables: &[String]) -> Vec<String> {
        if tables.is_empty() {
            return Vec::new();
        }
        let tables = tables.iter().map(|table| self.wrap(table)).collect::<Vec<_>>().join(",");
        vec![format!("drop table {} cascade", tables)]
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Vec<String> {
        if views.is_empty() {
            return Vec::new();
        }
        let views = views.iter().map(|view| self.wrap(view)).collect::<Vec<_>>().join(",");
        vec![format!("drop view {} cascade", views)]
    }

    fn compile_drop_all_types(&self, types: &[String]) -> Vec<String> {
        if types.is_empty() {
            return Vec::new();
        }
        let types = types.iter().map(|name| self.wrap(name)).collect::<Vec<_>>().join(",");
        vec![format!("drop type {} cascade", types)]
    }

    fn compile_drop_all_domains(&self, domains: &[String]) -> Vec<String> {
        if domains.is_empty() {
            return Vec::new();
        }
        let domains = domains.iter().map(|name| self.wrap(name)).collect::<Vec<_>>().join(",");
        vec![format!("drop domain {} cascade", domains)]
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "create index {} on {}{} ({})",
            self.wrap_value(command.index_name()),
            self.wrap_table(blueprint),
            command
                .algorithm
                .as_ref()
                .map(|algorithm| format!(" using {}", algorithm))
                .unwrap_or_default(),
            self.columnize(&command.columns)
        )])
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} add constraint {} unique ({}){}",
            self.wrap_table(blueprint),
            self.wrap_value(command.index_name()),
            self.columnize(&command.columns),
            Self::deferrable_clause(command)
        )])
    }

    fn compile_fulltext(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        let language = command.language.as_deref().unwrap_or("english");
        let vectors = command
            .columns
            .iter()
            .map(|column| format!("to_tsvector({}, {})", self.quote_string(language), self.wrap(column)))
            .collect::<Vec<_>>()
            .join(" || ");
        Ok(vec![format!(
            "create index {} on {} using gin (({}))",
            self.wrap_value(command.index_name()),
            self.wrap_table(blueprint),
            vectors
        )])
    }

    fn compile_primary(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} add primary key ({})",
            self.wrap_table(blueprint),
            self.columnize(&command.columns)
        )])
    }

    fn compile_foreign(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!(
            "alter table {} add constraint {} {}{}",
            self.wrap_table(blueprint),
            self.wrap_value(command.index_name()),
            self.compile_foreign_reference(blueprint, command)?,
            Self::deferrable_clause(command)
        )])
    }

    fn compile_drop_index(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(vec![format!("drop index {}", self.wrap_index(blueprint, command))])
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.drop_constraint(blueprint, command.index_name()))
    }

    fn compile_drop_fulltext(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        self.compile_drop_index(blueprint, command)
    }

    /// PostgreSQL names primary keys `{table}_pkey`
    fn compile_drop_primary(&self, blueprint: &Blueprint, _command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.drop_constraint(blueprint, &format!("{}_pkey", blueprint.get_table())))
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, command: &Command) -> SchemaResult<Vec<String>> {
        Ok(self.drop_constraint(blueprint, command.index_name()))
    }

    fn type_big_integer(&self, column: &ColumnDefinition) -> String {
        if Self::uses_serial(column) { "bigserial" } else { "bigint" }.to_string()
    }

    fn type_binary(&self, _column: &ColumnDefinition) -> String {
        "bytea".to_string()
    }

    fn type_boolean(&self, _column: &ColumnDefinition) -> String {
        "boolean".to_string()
    }

    fn type_char(&self, column: &ColumnDefinition) -> String {
        format!("char({})", column.string_length())
    }

    fn type_date(&self, _column: &ColumnDefinition) -> String {
        "date".to_string()
    }

    fn type_date_time(&self, column: &ColumnDefinition) -> String {
        self.type_timestamp(column)
    }

    fn type_date_time_tz(&self, column: &ColumnDefinition) -> String {
        self.type_timestamp_tz(column)
    }

    fn type_decimal(&self, column: &ColumnDefinition) -> String {
        format!("decimal({}, {})", column.total.unwrap_or(8), column.places.unwrap_or(2))
    }

    fn type_double(&self, _column: &ColumnDefinition) -> String {
        "double precision".to_string()
    }

    fn type_enum(&self, column: &ColumnDefinition) -> String {
        format!(
            "varchar(255) check ({} in ({}))",
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

    fn type_integer(&self, column: &ColumnDefinition) -> String {
        if Self::uses_serial(column) { "serial" } else { "integer" }.to_string()
    }

    fn type_json(&self, _column: &ColumnDefinition) -> String {
        "json".to_string()
    }

    fn type_jsonb(&self, _column: &ColumnDefinition) -> String {
        "jsonb".to_string()
    }

    fn type_long_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_medium_integer(&self, column: &ColumnDefinition) -> String {
        self.type_integer(column)
    }

    fn type_medium_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_small_integer(&self, column: &ColumnDefinition) -> String {
        if Self::uses_serial(column) { "smallserial" } else { "smallint" }.to_string()
    }

    fn type_string(&self, column: &ColumnDefinition) -> String {
        format!("varchar({})", column.string_length())
    }

    fn type_text(&self, _column: &ColumnDefinition) -> String {
        "text".to_string()
    }

    fn type_time(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("time", "without time zone", column)
    }

    fn type_time_tz(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("time", "with time zone", column)
    }

    fn type_timestamp(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("timestamp", "without time zone", column)
    }

    fn type_timestamp_tz(&self, column: &ColumnDefinition) -> String {
        Self::with_precision("timestamp", "with time zone", column)
    }

    fn type_tiny_integer(&self, column: &ColumnDefinition) -> String {
        self.type_small_integer(column)
    }

    fn type_tiny_text(&self, _column: &ColumnDefinition) -> String {
        "varchar(255)".to_string()
    }

    fn type_uuid(&self, _column: &ColumnDefinition) -> String {
        "uuid".to_string()
    }

    fn compile_tables(&self, _database: &str) -> String {
        "select c.relname as name, n.nspname as schema, pg_total_relation_size(c.oid) as size, \
         obj_description(c.oid, 'pg_class') as comment \
         from pg_class c, pg_namespace n \
         where c.relkind in ('r', 'p') and n.oid = c.relnamespace \
         and n.nspname not in ('pg_catalog', 'information_schema') \
         order by c.relname"
            .to_string()
    }

    fn compile_views(&self, _database: &str) -> String {
        "select viewname as name, schemaname as schema, definition from pg_views \
         where schemaname not in ('pg_catalog', 'information_schema') order by viewname"
            .to_string()
    }

    fn compile_types(&self) -> Option<String> {
        Some(
            "select t.typname as name, n.nspname as schema, t.typtype::text as type, \
             t.typcategory::text as category, \
             ((t.typinput = 'array_in'::regproc and t.typoutput = 'array_out'::regproc) or t.typtype = 'm') as implicit \
             from pg_type t \
             join pg_namespace n on n.oid = t.typnamespace \
             left join pg_class c on c.oid = t.typrelid \
             left join pg_type el on el.oid = t.typelem \
             left join pg_class ce on ce.oid = el.typrelid \
             where ((t.typrelid = 0 and (ce.relkind = 'c' or ce.relkind is null)) or c.relkind = 'c') \
             and not exists (select 1 from pg_depend d where d.objid in (t.oid, t.typelem) and d.deptype = 'e') \
             and n.nspname not in ('pg_catalog', 'information_schema')"
                .to_string(),
        )
    }

    fn compile_columns(&self, schema: &str, table: &str) -> String {
        format!(
            "select a.attname as name, t.typname as type_name, format_type(a.atttypid, a.atttypmod) as type, \
             (select tc.collcollate::text from pg_catalog.pg_collation tc where tc.oid = a.attcollation) as collation, \
             not a.attnotnull as nullable, \
             (select pg_get_expr(adbin, adrelid) from pg_attrdef where c.oid = pg_attrdef.adrelid and pg_attrdef.adnum = a.attnum) as default, \
             col_description(c.oid, a.attnum) as comment, \
             case when a.attidentity in ('a', 'd') then 'identity' else '' end as extra \
             from pg_attribute a, pg_class c, pg_type t, pg_namespace n \
             where c.relname = {} and n.nspname = {} and a.attnum > 0 and not a.attisdropped \
             and a.attrelid = c.oid and a.atttypid = t.oid and n.oid = c.relnamespace \
             order by a.attnum",
            self.quote_string(table),
            self.quote_string(schema)
        )
    }

    fn compile_indexes(&self, schema: &str, table: &str) -> String {
        format!(
            "select ic.relname as name, string_agg(a.attname, ',' order by indseq.ord) as columns, \
             am.amname as type, i.indisunique as unique, i.indisprimary as primary \
             from pg_index i \
             join pg_class tc on tc.oid = i.indrelid \
             join pg_namespace tn on tn.oid = tc.relnamespace \
             join pg_class ic on ic.oid = i.indexrelid \
             join pg_am am on am.oid = ic.relam \
             join lateral unnest(i.indkey) with ordinality as indseq(num, ord) on true \
             left join pg_attribute a on a.attrelid = i.indrelid and a.attnum = indseq.num \
             where tc.relname = {} and tn.nspname = {} \
             group by ic.relname, am.amname, i.indisunique, i.indisprimary",
            self.quote_string(table),
            self.quote_string(schema)
        )
    }

    fn compile_foreign_keys(&self, schema: &str, table: &str) -> String {
        format!(
            "select c.conname as name, string_agg(la.attname, ',' order by conseq.ord) as columns, \
             fn.nspname as foreign_schema, fc.relname as foreign_table, \
             string_agg(fa.attname, ',' order by conseq.ord) as foreign_columns, \
             c.confupdtype::text as on_update, c.confdeltype::text as on_delete \
             from pg_constraint c \
             join pg_class tc on c.conrelid = tc.oid \
             join pg_namespace tn on tn.oid = tc.relnamespace \
             join pg_class fc on c.confrelid = fc.oid \
             join pg_namespace fn on fn.oid = fc.relnamespace \
             join lateral unnest(c.conkey) with ordinality as conseq(num, ord) on true \
             join pg_attribute la on la.attrelid = c.conrelid and la.attnum = conseq.num \
             join pg_attribute fa on fa.attrelid = c.confrelid and fa.attnum = c.confkey[conseq.ord] \
             where c.contype = 'f' and tc.relname = {} and tn.nspname = {} \
             group by c.conname, fn.nspname, fc.relname, c.confupdtype, c.confdeltype",
            self.quote_string(table),
            self.quote_string(schema)
        )
    }

    /// `"data"->'a'->>'b'`; the last step is extracted as text
    fn compile_json_selector(&self, path: &JsonPath) -> String {
        let (parent, last) = path.split_last();
        match last {
            Some(segment) => format!("{}->>{}", self.json_path_expression(&parent), self.json_segment(&segment)),
            None => self.wrap(&path.column),
        }
    }

    fn compile_json_contains(&self, selector: &str, value: &JsonValue, not: bool) -> SchemaResult<CompiledSql> {
        let path = JsonPath::parse(selector)?;
        let sql = format!("({})::jsonb @> ?", self.json_path_expression(&path));
        Ok(CompiledSql::new(
            if not { format!("not {}", sql) } else { sql },
            vec![DatabaseValue::Json(value.clone())],
        ))
    }

    fn compile_json_contains_key(&self, selector: &str, not: bool) -> SchemaResult<String> {
        let path = JsonPath::parse(selector)?;
        let (parent, last) = path.split_last();
        let parent = self.json_path_expression(&parent);

        let sql = match last {
            Some(JsonSegment::Index(index)) => format!(
                "case when jsonb_typeof(({parent})::jsonb) = 'array' \
                 then jsonb_array_length(({parent})::jsonb) > {index} else false end",
                parent = parent,
                index = index
            ),
            Some(JsonSegment::Field(field)) => format!(
                "coalesce(({})::jsonb ?? {}, false)",
                parent,
                self.quote_string(&field)
            ),
            None => {
                return Err(SchemaError::compilation(format!(
                    "'{}' does not name a json key",
                    selector
                )))
            }
        };

        Ok(if not { format!("not {}", sql) } else { sql })
    }

    fn compile_json_length_expression(&self, path: &JsonPath) -> String {
        format!("jsonb_array_length(({})::jsonb)", self.json_path_expression(path))
    }

    fn compile_json_columns_update(&self, values: &[(String, JsonValue)]) -> SchemaResult<CompiledSql> {
        let mut clauses = Vec::new();
        let mut bindings = Vec::new();

        for (column, paths) in group_updates(values)? {
            let field = self.wrap(&column);
            let mut expression = format!("{}::jsonb", field);
            for (path, value) in paths {
                expression = format!("jsonb_set({}, {}, ?)", expression, self.jsonb_set_path(&path));
                bindings.push(DatabaseValue::Json(value));
            }
            clauses.push(format!("{} = {}", field, expression));
        }

        Ok(CompiledSql::new(clauses.join(", "), bindings))
    }

    fn compile_lock_for_update(&self) -> LockClause {
        LockClause::suffix("for update")
    }

    fn compile_shared_lock(&self) -> LockClause {
        LockClause::suffix("for share")
    }

    fn compile_random(&self, _seed: Option<&str>) -> String {
        "random()".to_string()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_create() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.create();
        blueprint.id();
        blueprint.string("name", None).comment("display name");
        blueprint.enumeration("role", &["admin", "user"]).default("user");
        blueprint.timestamp_tz("created_at", None).use_current();
        blueprint.unique(&["name"]);

        let sql = blueprint.to_sql(&PostgresGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table \"users\" (\"id\" bigserial not null primary key, \
                 \"name\" varchar(255) not null, \
                 \"role\" varchar(255) check (\"role\" in ('admin', 'user')) not null default 'user', \
                 \"created_at\" timestamp with time zone not null default CURRENT_TIMESTAMP)",
                "alter table \"users\" add constraint \"users_name_unique\" unique (\"name\")",
                "comment on column \"users\".\"name\" is 'display name'",
            ]
        );
    }

    #[test]
    fn test_identity_column() {
        let mut blueprint = Blueprint::new("tokens", "");
        blueprint.create();
        blueprint.integer("id").auto_increment().generated_as(Some("start with 100")).always();

        let sql = blueprint.to_sql(&PostgresGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table \"tokens\" (\"id\" integer not null generated always as identity \
                 (start with 100) primary key)"
            ]
        );
    }

    #[test]
    fn test_compile_change_is_a_sequence() {
        let mut blueprint = Blueprint::new("users", "");
        blueprint.string("name", Some(100)).nullable().default("guest").change();

        let sql = blueprint.to_sql(&PostgresGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table \"users\" alter column \"name\" type varchar(100)",
                "alter table \"users\" alter column \"name\" drop not null",
                "alter table \"users\" alter column \"name\" set default 'guest'",
                "comment on column \"users\".\"name\" is NULL",
            ]
        );
    }

    #[test]
    fn test_compile_alter_with_schema() {
        let mut blueprint = Blueprint::new("crm.users", "");
        blueprint.integer("votes").default(0);
        blueprint.index(&["votes"]).algorithm("btree");
        blueprint.fulltext(&["bio", "notes"]);
        blueprint.drop_index("crm_users_email_index");
        blueprint.drop_unique("crm_users_email_unique");
        blueprint.drop_primary();
        blueprint.rename("people");

        let sql = blueprint.to_sql(&PostgresGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table \"crm\".\"users\" add column \"votes\" integer not null default '0'",
                "create index \"crm_users_votes_index\" on \"crm\".\"users\" using btree (\"votes\")",
                "create index \"crm_users_bio_notes_fulltext\" on \"crm\".\"users\" using gin \
                 ((to_tsvector('english', \"bio\") || to_tsvector('english', \"notes\")))",
                "drop index \"crm\".\"crm_users_email_index\"",
                "alter table \"crm\".\"users\" drop constraint \"crm_users_email_unique\"",
                "alter table \"crm\".\"users\" drop constraint \"users_pkey\"",
                "alter table \"crm\".\"users\" rename to \"people\"",
            ]
        );
    }

    #[test]
    fn test_compile_foreign_with_deferrable() {
        let mut blueprint = Blueprint::new("posts", "app_");
        blueprint
            .foreign(&["user_id"])
            .references(&["id"])
            .on("users")
            .cascade_on_delete()
            .cascade_on_update()
            .deferrable()
            .initially_immediate();

        let sql = blueprint.to_sql(&PostgresGrammar::new()).unwrap();
        assert_eq!(
            sql,
            vec![
                "alter table \"app_posts\" add constraint \"app_posts_user_id_foreign\" foreign key (\"user_id\") \
                 references \"app_users\" (\"id\") on delete cascade on update cascade deferrable initially immediate"
            ]
        );
    }

    #[test]
    fn test_drop_all() {
        let grammar = PostgresGrammar::new();
        assert_eq!(
            grammar.compile_drop_all_tables(&["public.users".to_string(), "public.posts".to_string()]),
            vec!["drop table \"public\".\"users\",\"public\".\"posts\" cascade"]
        );
        assert!(grammar.compile_drop_all_views(&[]).is_empty());
        assert_eq!(
            grammar.compile_drop_all_types(&["public.mood".to_string()]),
            vec!["drop type \"public\".\"mood\" cascade"]
        );
    }

    #[test]
    fn test_json_predicates() {
        let grammar = PostgresGrammar::new();

        let contains = grammar.compile_json_contains("data->array", &json!("abc"), true).unwrap();
        assert_eq!(contains.sql, "not (\"data\"->'array')::jsonb @> ?");
        assert_eq!(contains.bindings, vec![DatabaseValue::Json(json!("abc"))]);

        assert_eq!(
            grammar.compile_json_contains_key("data->a->b", false).unwrap(),
            "coalesce((\"data\"->'a')::jsonb ?? 'b', false)"
        );
        assert_eq!(
            grammar.compile_json_contains_key("data->items[2]", false).unwrap(),
            "case when jsonb_typeof((\"data\"->'items')::jsonb) = 'array' \
             then jsonb_array_length((\"data\"->'items')::jsonb) > 2 else false end"
        );

        let path = JsonPath::parse("data->objects[0]->level").unwrap();
        assert_eq!(grammar.compile_json_selector(&path), "\"data\"->'objects'->0->>'level'");

        let length = grammar.compile_json_length("data->tags", ">=", 1).unwrap();
        assert_eq!(
            grammar.prepare_placeholders(&length.sql),
            "jsonb_array_length((\"data\"->'tags')::jsonb) >= $1"
        );
    }

    #[test]
    fn test_json_columns_update_nests_jsonb_set() {
        let grammar = PostgresGrammar::new();
        let update = grammar
            .compile_json_columns_update(&[
                ("data->name".to_string(), json!("krishan")),
                ("data->items[0]".to_string(), json!({"id": 1})),
                ("meta->flag".to_string(), json!(false)),
            ])
            .unwrap();

        assert_eq!(
            update.sql,
            "\"data\" = jsonb_set(jsonb_set(\"data\"::jsonb, '{\"name\"}', ?), '{\"items\",0}', ?), \
             \"meta\" = jsonb_set(\"meta\"::jsonb, '{\"flag\"}', ?)"
        );
        assert_eq!(update.bindings.len(), 3);
        assert_eq!(update.bindings[1], DatabaseValue::Json(json!({"id": 1})));
    }

    #[test]
    fn test_query_clauses() {
        let grammar = PostgresGrammar::new();
        assert_eq!(grammar.compile_shared_lock().sql, "for share");
        assert_eq!(grammar.compile_random(Some("1")), "random()");
        assert!(grammar.compile_types().is_some());
    }
}
