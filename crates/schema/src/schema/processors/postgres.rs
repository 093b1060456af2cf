//! PostgreSQL processor
//!
//! pg_catalog reports foreign key actions and type kinds as single-letter
//! codes; they are expanded to the words the other dialects use.

use super::{is_nullable, non_empty, split_columns, DBColumn, DBForeignKey, DBIndex, DBType, Processor};
use crate::schema::types::{Column, ForeignKey, Index, Type};

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresProcessor;

impl Processor for PostgresProcessor {
    fn process_columns(&self, columns: Vec<DBColumn>) -> Vec<Column> {
        columns
            .into_iter()
            .map(|column| {
                let sequence_default = column
                    .default
                    .as_deref()
                    .map(|default| default.starts_with("nextval("))
                    .unwrap_or(false);
                let autoincrement = sequence_default || column.extra == "identity";

                Column {
                    name: column.name,
                    column_type: column.column_type,
                    type_name: column.type_name,
                    nullable: is_nullable(&column.nullable),
                    default: if autoincrement { None } else { column.default },
                    comment: non_empty(column.comment),
                    collation: column.collation,
                    autoincrement,
                }
            })
            .collect()
    }

    fn process_indexes(&self, indexes: Vec<DBIndex>) -> Vec<Index> {
        indexes
            .into_iter()
            .map(|index| Index {
                name: index.name.to_lowercase(),
                columns: split_columns(&index.columns),
                index_type: index.index_type.to_lowercase(),
                primary: index.primary,
                unique: index.unique,
            })
            .collect()
    }

    fn process_foreign_keys(&self, foreign_keys: Vec<DBForeignKey>) -> Vec<ForeignKey> {
        foreign_keys
            .into_iter()
            .map(|foreign_key| ForeignKey {
                name: foreign_key.name,
                columns: split_columns(&foreign_key.columns),
                foreign_schema: foreign_key.foreign_schema,
                foreign_table: foreign_key.foreign_table,
                foreign_columns: split_columns(&foreign_key.foreign_columns),
                on_update: action(&foreign_key.on_update),
                on_delete: action(&foreign_key.on_delete),
            })
            .collect()
    }

    fn process_types(&self, types: Vec<DBType>) -> Vec<Type> {
        types
            .into_iter()
            .map(|ty| Type {
                kind: kind(&ty.kind).to_string(),
                category: category(&ty.category).to_string(),
                name: ty.name,
                schema: ty.schema,
                implicit: ty.implicit,
            })
            .collect()
    }
}

fn action(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "a" => "no action",
        "r" => "restrict",
        "c" => "cascade",
        "n" => "set null",
        "d" => "set default",
        other => return other.to_string(),
    }
    .to_string()
}

fn kind(code: &str) -> &'static str {
    match code.to_lowercase().as_str() {
        "b" => "base",
        "c" => "composite",
        "d" => "domain",
        "e" => "enum",
        "p" => "pseudo",
        "r" => "range",
        "m" => "multirange",
        _ => "",
    }
}

fn category(code: &str) -> &'static str {
    match code.to_lowercase().as_str() {
        "a" => "array",
        "b" => "boolean",
        "c" => "composite",
        "d" => "date_time",
        "e" => "enum",
        "g" => "geometric",
        "i" => "network_address",
        "n" => "numeric",
        "p" => "pseudo",
        "r" => "range",
        "s" => "string",
        "t" => "timespan",
        "u" => "user_defined",
        "v" => "bit_string",
        "x" => "unknown",
        "z" => "internal_use",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_and_identity_columns() {
        let columns = PostgresProcessor.process_columns(vec![
            DBColumn {
                name: "id".into(),
                column_type: "bigint".into(),
                type_name: "int8".into(),
                nullable: "0".into(),
                default: Some("nextval('users_id_seq'::regclass)".into()),
                ..Default::default()
            },
            DBColumn {
                name: "code".into(),
                column_type: "integer".into(),
                type_name: "int4".into(),
                nullable: "0".into(),
                extra: "identity".into(),
                ..Default::default()
            },
            DBColumn {
                name: "status".into(),
                column_type: "character varying(255)".into(),
                type_name: "varchar".into(),
                nullable: "1".into(),
                default: Some("'active'::character varying".into()),
                comment: Some("state".into()),
                ..Default::default()
            },
        ]);

        assert!(columns[0].autoincrement);
        assert_eq!(columns[0].default, None);
        assert!(!columns[0].nullable);
        assert!(columns[1].autoincrement);
        assert!(!columns[2].autoincrement);
        assert!(columns[2].nullable);
        assert_eq!(columns[2].default.as_deref(), Some("'active'::character varying"));
        assert_eq!(columns[2].comment.as_deref(), Some("state"));
    }

    #[test]
    fn test_foreign_key_action_codes() {
        let foreign_keys = PostgresProcessor.process_foreign_keys(vec![DBForeignKey {
            name: "posts_user_id_foreign".into(),
            columns: "user_id".into(),
            foreign_schema: "public".into(),
            foreign_table: "users".into(),
            foreign_columns: "id".into(),
            on_update: "a".into(),
            on_delete: "c".into(),
        }]);
        assert_eq!(foreign_keys[0].on_update, "no action");
        assert_eq!(foreign_keys[0].on_delete, "cascade");
        assert_eq!(action("n"), "set null");
        assert_eq!(action("d"), "set default");
        assert_eq!(action("r"), "restrict");
    }

    #[test]
    fn test_types_and_indexes() {
        let types = PostgresProcessor.process_types(vec![DBType {
            name: "mood".into(),
            schema: "public".into(),
            kind: "e".into(),
            category: "E".into(),
            implicit: false,
        }]);
        assert_eq!(types[0].kind, "enum");
        assert_eq!(types[0].category, "enum");

        let indexes = PostgresProcessor.process_indexes(vec![DBIndex {
            name: "users_pkey".into(),
            columns: "id".into(),
            index_type: "btree".into(),
            primary: true,
            unique: true,
        }]);
        assert!(indexes[0].primary);
        assert_eq!(indexes[0].columns, vec!["id"]);
    }
}
