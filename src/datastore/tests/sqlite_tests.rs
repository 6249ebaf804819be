use super::*;
use crate::query::{binds, QueryModel};
use serde_json::json;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> SqliteDatastore {
    let store = SqliteDatastore::new(dir.path().join("db").join("facegate.sqlite"));
    store.apply_schema(&TableNames::default()).await.unwrap();
    store.connect().await.unwrap();
    store
}

#[tokio::test]
async fn test_apply_schema_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let store = SqliteDatastore::new(dir.path().join("nested").join("a.sqlite"));
    store.apply_schema(&TableNames::default()).await.unwrap();
    assert!(store.path().exists());
}

#[tokio::test]
async fn test_apply_schema_rejects_bad_table_name() {
    let dir = TempDir::new().unwrap();
    let store = SqliteDatastore::new(dir.path().join("a.sqlite"));
    let tables = TableNames {
        perfis: "perfis; DROP TABLE x".to_string(),
        ..TableNames::default()
    };
    assert!(store.apply_schema(&tables).await.is_err());
}

#[tokio::test]
async fn test_insert_then_select_with_named_binds() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mut insert = QueryModel::new("perfis").with_values(binds([
        ("id", json!("12345678")),
        ("nome", json!("Ana")),
        ("alias", json!("ana")),
        ("email", json!("ana@example.com")),
    ]));
    let sql = insert.insert().unwrap().to_string();
    let affected = store.execute(&sql, &insert.binds()).await.unwrap();
    assert_eq!(affected, 1);

    let mut select = QueryModel::new("perfis");
    let sql = select
        .select(Some(binds([("email", json!("ana@example.com"))])))
        .unwrap()
        .to_string();
    let row = store.fetch_one(&sql, &select.binds()).await.unwrap().unwrap();
    assert_eq!(row["nome"], json!("Ana"));
    assert_eq!(row["permission_level"], json!("discente"));
    assert_eq!(row["encodings"], Value::Null);
}

#[tokio::test]
async fn test_fetch_all_preserves_column_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .execute(
            "INSERT INTO dispositivos (mac, local, ip) VALUES (:mac, :local, :ip)",
            &binds([("mac", json!("aa")), ("local", json!("lab")), ("ip", json!("10.0.0.2"))]),
        )
        .await
        .unwrap();

    let rows = store
        .fetch_all("SELECT ip, mac FROM dispositivos", &BindMap::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(columns, vec!["ip", "mac"]);
}

#[tokio::test]
async fn test_fetch_one_on_empty_table_is_none() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let row = store
        .fetch_one("SELECT * FROM historico", &BindMap::new())
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_query_without_connection_fails() {
    let dir = TempDir::new().unwrap();
    let store = SqliteDatastore::new(dir.path().join("a.sqlite"));
    let err = store
        .fetch_all("SELECT 1", &BindMap::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not connected"));
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.disconnect().await.unwrap();
    store.disconnect().await.unwrap();
}

#[test]
fn test_json_values_map_to_sqlite() {
    assert_eq!(to_sql(&json!(true)), SqlValue::Integer(1));
    assert_eq!(to_sql(&json!(7)), SqlValue::Integer(7));
    assert_eq!(to_sql(&json!(0.5)), SqlValue::Real(0.5));
    assert_eq!(to_sql(&json!(null)), SqlValue::Null);
    assert_eq!(to_sql(&json!([1, 2])), SqlValue::Text("[1,2]".to_string()));
}

#[tokio::test]
async fn test_unused_binds_are_ignored() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let rows = store
        .fetch_all(
            "SELECT * FROM perfis WHERE email = :email",
            &binds([("email", json!("x@y.z")), ("unused", json!(1))]),
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}
