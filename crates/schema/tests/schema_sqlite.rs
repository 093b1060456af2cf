//! Schema builder and introspection against an in-memory SQLite database

use elif_schema::{ConnectionConfig, DatabaseValue, Dialect, Schema, SchemaError, SqliteExecutor};
use serde_json::json;
use std::sync::Arc;

async fn sqlite_schema() -> Schema {
    let executor = SqliteExecutor::memory().await.unwrap();
    Schema::with_executor(
        ConnectionConfig::new(Dialect::Sqlite, "sqlite::memory:"),
        Arc::new(executor),
    )
    .unwrap()
}

async fn create_users(schema: &Schema) {
    schema
        .create("users", |table| {
            table.id();
            table.string("name", None).default("guest");
            table.string("email", None).unique();
            table.integer("votes").default(0);
            table.boolean("active").default(true);
            table.text("bio").nullable();
            table.enumeration("status", &["draft", "published"]);
            table.timestamps(None);
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_and_introspect_table() {
    let schema = sqlite_schema().await;
    create_users(&schema).await;

    assert!(schema.has_table("users").await.unwrap());
    assert!(!schema.has_table("posts").await.unwrap());
    assert_eq!(schema.get_table_listing().await.unwrap(), vec!["users".to_string()]);
    assert!(schema.has_columns("users", &["id", "email", "bio"]).await.unwrap());
    assert!(!schema.has_columns("users", &["id", "missing"]).await.unwrap());

    let columns = schema.get_columns("users").await.unwrap();
    let column = |name: &str| columns.iter().find(|c| c.name == name).unwrap().clone();

    let id = column("id");
    assert_eq!(id.column_type, "integer");
    assert!(id.autoincrement);
    assert!(!id.nullable);

    let name = column("name");
    assert_eq!(name.column_type, "varchar");
    assert_eq!(name.default.as_deref(), Some("'guest'"));
    assert!(!name.autoincrement);

    assert_eq!(column("votes").default.as_deref(), Some("'0'"));
    assert_eq!(column("active").type_name, "tinyint");
    assert!(column("bio").nullable);
    assert_eq!(column("bio").column_type, "text");
    assert_eq!(column("created_at").column_type, "datetime");
    assert!(column("created_at").nullable);
}

#[tokio::test]
async fn test_indexes() {
    let schema = sqlite_schema().await;
    create_users(&schema).await;

    let indexes = schema.get_indexes("users").await.unwrap();
    let primary = indexes.iter().find(|index| index.primary).unwrap();
    assert_eq!(primary.name, "primary");
    assert_eq!(primary.columns, vec!["id".to_string()]);

    let unique = indexes.iter().find(|index| index.name == "users_email_unique").unwrap();
    assert!(unique.unique);
    assert_eq!(unique.columns, vec!["email".to_string()]);

    assert!(schema.has_index("users", "USERS_EMAIL_UNIQUE").await.unwrap());
    assert!(schema.has_index_on("users", &["email"]).await.unwrap());
    assert!(!schema.has_index_on("users", &["name"]).await.unwrap());

    schema
        .table("users", |table| {
            table.index(&["name", "votes"]);
        })
        .await
        .unwrap();
    assert!(schema.has_index("users", "users_name_votes_index").await.unwrap());
}

#[tokio::test]
async fn test_alter_rename_and_drop() {
    let schema = sqlite_schema().await;
    create_users(&schema).await;

    schema
        .table("users", |table| {
            table.string("nickname", None).nullable();
        })
        .await
        .unwrap();
    assert!(schema.has_column("users", "nickname").await.unwrap());

    schema
        .table("users", |table| {
            table.rename_column("nickname", "handle");
        })
        .await
        .unwrap();
    assert!(schema.has_column("users", "handle").await.unwrap());
    assert!(!schema.has_column("users", "nickname").await.unwrap());

    let changed = schema
        .table("users", |table| {
            table.string("handle", Some(50)).change();
        })
        .await;
    assert!(matches!(changed, Err(SchemaError::Unsupported { .. })));

    schema.rename("users", "people").await.unwrap();
    assert!(schema.has_table("people").await.unwrap());
    assert!(!schema.has_table("users").await.unwrap());

    schema.drop_if_exists("missing").await.unwrap();
    let dropped = schema.drop("missing").await;
    assert!(dropped.unwrap_err().is_execution());

    schema.drop("people").await.unwrap();
    assert!(schema.get_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schema_qualified_names_are_unsupported() {
    let schema = sqlite_schema().await;

    let created = schema
        .create("reporting.users", |table| {
            table.id();
        })
        .await;
    assert!(matches!(created, Err(SchemaError::Unsupported { .. })));
    assert!(matches!(
        schema.get_columns("reporting.users").await,
        Err(SchemaError::Unsupported { .. })
    ));
}

#[tokio::test]
async fn test_foreign_keys() {
    let schema = sqlite_schema().await;
    create_users(&schema).await;

    schema
        .create("posts", |table| {
            table.id();
            table.foreign_id("user_id");
            table.foreign_id("editor_id").nullable();
            table.string("title", None);
            table
                .foreign(&["user_id"])
                .references(&["id"])
                .on("users")
                .cascade_on_delete()
                .cascade_on_update();
            table.foreign(&["editor_id"]).references(&["id"]).on("users");
        })
        .await
        .unwrap();

    let foreign_keys = schema.get_foreign_keys("posts").await.unwrap();
    assert_eq!(foreign_keys.len(), 2);

    let user = foreign_keys.iter().find(|fk| fk.columns == vec!["user_id".to_string()]).unwrap();
    assert_eq!(user.foreign_table, "users");
    assert_eq!(user.foreign_columns, vec!["id".to_string()]);
    assert_eq!(user.on_delete, "cascade");
    assert_eq!(user.on_update, "cascade");

    let editor = foreign_keys.iter().find(|fk| fk.columns == vec!["editor_id".to_string()]).unwrap();
    assert_eq!(editor.on_delete, "no action");

    schema
        .sql("insert into \"users\" (\"email\", \"status\") values ('a@example.com', 'draft')")
        .await
        .unwrap();
    schema
        .sql("insert into \"posts\" (\"user_id\", \"title\") values (1, 'hello')")
        .await
        .unwrap();
    schema.sql("delete from \"users\"").await.unwrap();

    let rows = schema
        .driver()
        .select("select count(*) as \"total\" from \"posts\"", &[])
        .await
        .unwrap();
    assert_eq!(rows[0].get_i64("total"), Some(0));
}

#[tokio::test]
async fn test_views_and_drop_all() {
    let schema = sqlite_schema().await;
    create_users(&schema).await;
    schema
        .sql("create view \"active_users\" as select * from \"users\" where \"active\" = 1")
        .await
        .unwrap();

    assert!(schema.has_view("active_users").await.unwrap());
    let views = schema.get_views().await.unwrap();
    assert_eq!(views[0].schema, "main");
    assert!(views[0].definition.to_lowercase().starts_with("create view"));
    assert!(schema.get_types().await.unwrap().is_empty());

    schema.drop_all_views().await.unwrap();
    assert!(schema.get_view_listing().await.unwrap().is_empty());

    schema.drop_all_tables().await.unwrap();
    assert!(schema.get_table_listing().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_json_predicates() {
    let schema = sqlite_schema().await;
    schema
        .create("documents", |table| {
            table.id();
            table.json("data");
        })
        .await
        .unwrap();
    for data in [r#"{"array":["abc","def"]}"#, r#"{"array":["xyz"]}"#, r#"{"other":1}"#] {
        schema
            .driver()
            .execute("insert into \"documents\" (\"data\") values (?)", &[DatabaseValue::from(data)])
            .await
            .unwrap();
    }

    let ids = |sql: String, bindings: Vec<DatabaseValue>| {
        let schema = schema.clone();
        async move {
            let query = format!("select \"id\" from \"documents\" where {} order by \"id\"", sql);
            schema
                .driver()
                .select(&query, &bindings)
                .await
                .unwrap()
                .iter()
                .filter_map(|row| row.get_i64("id"))
                .collect::<Vec<_>>()
        }
    };

    let contains = schema.grammar().compile_json_contains("data->array", &json!("abc"), false).unwrap();
    assert_eq!(ids(contains.sql, contains.bindings).await, vec![1]);

    let missing = schema.grammar().compile_json_contains("data->array", &json!("abc"), true).unwrap();
    assert_eq!(ids(missing.sql, missing.bindings).await, vec![2, 3]);

    let key = schema.grammar().compile_json_contains_key("data->other", false).unwrap();
    assert_eq!(ids(key, Vec::new()).await, vec![3]);

    let length = schema.grammar().compile_json_length("data->array", ">", 1).unwrap();
    assert_eq!(ids(length.sql, length.bindings).await, vec![1]);
}

#[tokio::test]
async fn test_json_columns_update() {
    let schema = sqlite_schema().await;
    schema
        .create("settings", |table| {
            table.id();
            table.json("options");
        })
        .await
        .unwrap();
    schema
        .sql(r#"insert into "settings" ("options") values ('{"theme":{"name":"light","dark":false},"size":1}')"#)
        .await
        .unwrap();

    let update = schema
        .grammar()
        .compile_json_columns_update(&[
            ("options->theme->name".to_string(), json!("solarized")),
            ("options->theme->dark".to_string(), json!(true)),
        ])
        .unwrap();
    let sql = format!("update \"settings\" set {} where \"id\" = 1", update.sql);
    assert_eq!(schema.driver().execute(&sql, &update.bindings).await.unwrap(), 1);

    let rows = schema
        .driver()
        .select(
            "select json_extract(\"options\", '$.theme.name') as \"name\", \
             json_extract(\"options\", '$.theme.dark') as \"dark\", \
             json_extract(\"options\", '$.size') as \"size\" from \"settings\"",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows[0].get_optional_string("name").as_deref(), Some("solarized"));
    assert!(rows[0].get_bool("dark"));
    assert_eq!(rows[0].get_i64("size"), Some(1));
}

#[tokio::test]
async fn test_rust_types_for_columns() {
    let schema = sqlite_schema().await;
    create_users(&schema).await;

    let columns = schema.get_columns("users").await.unwrap();
    let rust_type = |name: &str| schema.rust_type(columns.iter().find(|c| c.name == name).unwrap());

    assert_eq!(rust_type("active"), "bool");
    assert_eq!(rust_type("name"), "String");
    assert_eq!(rust_type("bio"), "Option<String>");
    assert_eq!(rust_type("created_at"), "Option<NaiveDateTime>");
}
