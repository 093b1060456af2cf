//! SQLite processor

use super::{is_nullable, non_empty, split_columns, DBColumn, DBForeignKey, DBIndex, Processor};
use crate::schema::types::{Column, ForeignKey, Index};

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProcessor;

impl Processor for SqliteProcessor {
    fn process_columns(&self, columns: Vec<DBColumn>) -> Vec<Column> {
        // Only a lone integer primary key aliases the rowid
        let single_primary = columns.iter().filter(|column| column.primary).count() == 1;

        columns
            .into_iter()
            .map(|column| {
                let column_type = column.column_type.to_lowercase();
                let type_name = column_type
                    .split('(')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                Column {
                    autoincrement: single_primary && column.primary && type_name == "integer",
                    name: column.name,
                    column_type,
                    type_name,
                    nullable: is_nullable(&column.nullable),
                    default: column.default,
                    comment: non_empty(column.comment),
                    collation: column.collation,
                }
            })
            .collect()
    }

    fn process_indexes(&self, indexes: Vec<DBIndex>) -> Vec<Index> {
        let primary_count = indexes.iter().filter(|index| index.primary).count();

        indexes
            .into_iter()
            // an explicit pk index supersedes the synthesized one
            .filter(|index| primary_count <= 1 || index.name != "primary")
            .map(|index| Index {
                name: index.name.to_lowercase(),
                columns: split_columns(&index.columns),
                index_type: String::new(),
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
                on_update: foreign_key.on_update.to_lowercase(),
                on_delete: foreign_key.on_delete.to_lowercase(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ty: &str, primary: bool) -> DBColumn {
        DBColumn {
            name: name.into(),
            column_type: ty.into(),
            nullable: "0".into(),
            primary,
            ..Default::default()
        }
    }

    #[test]
    fn test_autoincrement_needs_single_integer_primary() {
        let columns = SqliteProcessor.process_columns(vec![
            column("id", "INTEGER", true),
            column("name", "varchar(255)", false),
        ]);
        assert!(columns[0].autoincrement);
        assert_eq!(columns[0].type_name, "integer");
        assert_eq!(columns[1].column_type, "varchar(255)");
        assert_eq!(columns[1].type_name, "varchar");
        assert!(!columns[1].nullable);

        let columns = SqliteProcessor.process_columns(vec![
            column("user_id", "integer", true),
            column("role_id", "integer", true),
        ]);
        assert!(!columns[0].autoincrement);
        assert!(!columns[1].autoincrement);
    }

    #[test]
    fn test_synthesized_primary_dropped_when_duplicated() {
        let index = |name: &str, primary: bool| DBIndex {
            name: name.into(),
            columns: "code".into(),
            index_type: String::new(),
            primary,
            unique: true,
        };

        let indexes = SqliteProcessor.process_indexes(vec![
            index("primary", true),
            index("sqlite_autoindex_countries_1", true),
        ]);
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "sqlite_autoindex_countries_1");

        let indexes = SqliteProcessor.process_indexes(vec![index("primary", true), index("countries_code_unique", false)]);
        assert_eq!(indexes.len(), 2);
    }

    #[test]
    fn test_foreign_key_actions_lowercased() {
        let foreign_keys = SqliteProcessor.process_foreign_keys(vec![DBForeignKey {
            name: String::new(),
            columns: "user_id".into(),
            foreign_schema: "main".into(),
            foreign_table: "users".into(),
            foreign_columns: "id".into(),
            on_update: "NO ACTION".into(),
            on_delete: "CASCADE".into(),
        }]);
        assert_eq!(foreign_keys[0].on_update, "no action");
        assert_eq!(foreign_keys[0].on_delete, "cascade");
    }
}
