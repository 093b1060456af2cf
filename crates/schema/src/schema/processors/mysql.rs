//! MySQL processor

use super::{is_nullable, non_empty, split_columns, DBColumn, DBForeignKey, DBIndex, Processor};
use crate::schema::types::{Column, ForeignKey, Index};

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlProcessor;

impl Processor for MySqlProcessor {
    fn process_columns(&self, columns: Vec<DBColumn>) -> Vec<Column> {
        columns
            .into_iter()
            .map(|column| Column {
                autoincrement: column.extra.to_lowercase().contains("auto_increment"),
                name: column.name,
                type_name: column.type_name.to_lowercase(),
                column_type: column.column_type,
                nullable: is_nullable(&column.nullable),
                default: column.default,
                comment: non_empty(column.comment),
                collation: column.collation,
            })
            .collect()
    }

    fn process_indexes(&self, indexes: Vec<DBIndex>) -> Vec<Index> {
        indexes
            .into_iter()
            .map(|index| {
                let name = index.name.to_lowercase();
                Index {
                    primary: name == "primary",
                    columns: split_columns(&index.columns),
                    index_type: index.index_type.to_lowercase(),
                    unique: index.unique,
                    name,
                }
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
                on_update: foreign_key.on_update.to_lowercase(),
                on_delete: foreign_key.on_delete.to_lowercase(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_columns() {
        let columns = MySqlProcessor.process_columns(vec![
            DBColumn {
                name: "id".into(),
                column_type: "bigint unsigned".into(),
                type_name: "BIGINT".into(),
                nullable: "NO".into(),
                extra: "auto_increment".into(),
                comment: Some(String::new()),
                ..Default::default()
            },
            DBColumn {
                name: "name".into(),
                column_type: "varchar(255)".into(),
                type_name: "varchar".into(),
                nullable: "YES".into(),
                default: Some("guest".into()),
                comment: Some("display name".into()),
                collation: Some("utf8mb4_unicode_ci".into()),
                ..Default::default()
            },
        ]);

        assert!(columns[0].autoincrement);
        assert!(!columns[0].nullable);
        assert_eq!(columns[0].type_name, "bigint");
        assert_eq!(columns[0].comment, None);
        assert!(columns[1].nullable);
        assert_eq!(columns[1].default.as_deref(), Some("guest"));
        assert_eq!(columns[1].comment.as_deref(), Some("display name"));
    }

    #[test]
    fn test_process_indexes_and_foreign_keys() {
        let indexes = MySqlProcessor.process_indexes(vec![DBIndex {
            name: "PRIMARY".into(),
            columns: "id".into(),
            index_type: "BTREE".into(),
            primary: false,
            unique: true,
        }]);
        assert_eq!(indexes[0].name, "primary");
        assert!(indexes[0].primary);
        assert_eq!(indexes[0].index_type, "btree");

        let foreign_keys = MySqlProcessor.process_foreign_keys(vec![DBForeignKey {
            name: "posts_user_id_foreign".into(),
            columns: "user_id".into(),
            foreign_schema: "shop".into(),
            foreign_table: "users".into(),
            foreign_columns: "id".into(),
            on_update: "NO ACTION".into(),
            on_delete: "CASCADE".into(),
        }]);
        assert_eq!(foreign_keys[0].on_update, "no action");
        assert_eq!(foreign_keys[0].on_delete, "cascade");
    }
}
