//! SQL Server processor
//!
//! sys.columns reports the bare type name plus length, precision and scale;
//! the full type is rebuilt from those. Lengths are storage bytes, so
//! `nvarchar` columns read back at twice their declared character count.

use super::{is_nullable, non_empty, split_columns, DBColumn, DBForeignKey, DBIndex, Processor};
use crate::schema::types::{Column, ForeignKey, Index};

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerProcessor;

impl Processor for SqlServerProcessor {
    fn process_columns(&self, columns: Vec<DBColumn>) -> Vec<Column> {
        columns
            .into_iter()
            .map(|column| Column {
                column_type: full_type(&column),
                type_name: column.type_name,
                nullable: is_nullable(&column.nullable),
                default: column.default,
                comment: non_empty(column.comment),
                collation: column.collation,
                autoincrement: column.autoincrement,
                name: column.name,
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
}

fn full_type(column: &DBColumn) -> String {
    let name = column.type_name.as_str();
    match name {
        "binary" | "varbinary" | "char" | "varchar" | "nchar" | "nvarchar" => {
            if column.length == -1 {
                format!("{}(max)", name)
            } else {
                format!("{}({})", name, column.length)
            }
        }
        "decimal" | "numeric" => format!("{}({},{})", name, column.precision, column.places),
        "float" => format!("{}({})", name, column.precision),
        "datetime2" | "datetimeoffset" | "time" => format!("{}({})", name, column.places),
        _ => name.to_string(),
    }
}

/// `SET_NULL` and friends
fn action(desc: &str) -> String {
    desc.to_lowercase().replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(type_name: &str, length: i64, precision: i64, places: i64) -> DBColumn {
        DBColumn {
            name: "c".into(),
            type_name: type_name.into(),
            nullable: "1".into(),
            length,
            precision,
            places,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_type_rebuilt() {
        assert_eq!(full_type(&column("nvarchar", 510, 0, 0)), "nvarchar(510)");
        assert_eq!(full_type(&column("nvarchar", -1, 0, 0)), "nvarchar(max)");
        assert_eq!(full_type(&column("varbinary", -1, 0, 0)), "varbinary(max)");
        assert_eq!(full_type(&column("decimal", 9, 8, 2)), "decimal(8,2)");
        assert_eq!(full_type(&column("float", 8, 53, 0)), "float(53)");
        assert_eq!(full_type(&column("datetime2", 8, 27, 7)), "datetime2(7)");
        assert_eq!(full_type(&column("int", 4, 10, 0)), "int");
    }

    #[test]
    fn test_process_columns_keeps_raw_default() {
        let mut raw = column("int", 4, 10, 0);
        raw.default = Some("((1))".into());
        raw.autoincrement = true;
        raw.nullable = "0".into();

        let columns = SqlServerProcessor.process_columns(vec![raw]);
        assert_eq!(columns[0].default.as_deref(), Some("((1))"));
        assert!(columns[0].autoincrement);
        assert!(!columns[0].nullable);
    }

    #[test]
    fn test_indexes_and_actions() {
        let indexes = SqlServerProcessor.process_indexes(vec![DBIndex {
            name: "PK__users__3213E83F".into(),
            columns: "id".into(),
            index_type: "CLUSTERED".into(),
            primary: true,
            unique: true,
        }]);
        assert_eq!(indexes[0].index_type, "clustered");

        let foreign_keys = SqlServerProcessor.process_foreign_keys(vec![DBForeignKey {
            name: "posts_user_id_foreign".into(),
            columns: "user_id".into(),
            foreign_schema: "dbo".into(),
            foreign_table: "users".into(),
            foreign_columns: "id".into(),
            on_update: "NO_ACTION".into(),
            on_delete: "SET_NULL".into(),
        }]);
        assert_eq!(foreign_keys[0].on_update, "no action");
        assert_eq!(foreign_keys[0].on_delete, "set null");
    }
}
