//! SQLite evaluation integration tests.
//!
//! Each test seeds a fresh database file in a temporary directory.

use db_sqlprobe::error::ProbeError;
use db_sqlprobe::evaluator::Evaluator;
use db_sqlprobe::output::{FieldValue, ResultField};
use db_sqlprobe::request::QueryRequest;
use pretty_assertions::assert_eq;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::Path;
use tempfile::TempDir;

const SEED: &str = "
CREATE TABLE probes (
    id INTEGER PRIMARY KEY,
    ratio REAL,
    label TEXT,
    active BOOLEAN,
    seen DATETIME
);
INSERT INTO probes VALUES (1, 0.25, 'alpha', 1, '2024-01-01 00:00:00');
INSERT INTO probes VALUES (2, 1.5, NULL, 0, NULL);
";

/// Creates a seeded database and returns its directory and connection string.
async fn seeded_database() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probe.db");
    seed(&path).await;
    let connection_string = format!("Database={}", path.display());
    (dir, connection_string)
}

async fn seed(path: &Path) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::raw_sql(SEED).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_select_literal() {
    let (_dir, connection_string) = seeded_database().await;

    let item = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite",
            "3",
            connection_string.as_str(),
            "SELECT 1 AS n",
        ))
        .await
        .unwrap();

    assert_eq!(item.engine, "sqlite");
    assert_eq!(item.results.len(), 1);
    assert_eq!(
        item.results[0].fields,
        vec![ResultField::new("n", FieldValue::Integer(1))]
    );
}

#[tokio::test]
async fn test_unrepresentable_and_null_columns_are_omitted() {
    let (_dir, connection_string) = seeded_database().await;

    let item = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite3",
            "3",
            connection_string.as_str(),
            "SELECT id, ratio, label, active, seen FROM probes ORDER BY id",
        ))
        .await
        .unwrap();

    assert_eq!(item.results.len(), 2);
    assert_eq!(
        item.results[0].fields,
        vec![
            ResultField::new("id", FieldValue::Integer(1)),
            ResultField::new("ratio", FieldValue::Float(0.25)),
            ResultField::new("label", FieldValue::String("alpha".to_string())),
        ]
    );
    assert_eq!(
        item.results[1].fields,
        vec![
            ResultField::new("id", FieldValue::Integer(2)),
            ResultField::new("ratio", FieldValue::Float(1.5)),
        ]
    );
}

#[tokio::test]
async fn test_multiple_statements_yield_records_in_order() {
    let (_dir, connection_string) = seeded_database().await;

    let item = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite",
            "3",
            connection_string.as_str(),
            "SELECT id FROM probes WHERE id = 2; SELECT label FROM probes WHERE id = 1",
        ))
        .await
        .unwrap();

    assert_eq!(item.results.len(), 2);
    assert_eq!(
        item.results[0].field("id").map(|f| &f.value),
        Some(&FieldValue::Integer(2))
    );
    assert_eq!(
        item.results[1].field("label").map(|f| &f.value),
        Some(&FieldValue::String("alpha".to_string()))
    );
}

#[tokio::test]
async fn test_empty_result_contributes_nothing() {
    let (_dir, connection_string) = seeded_database().await;

    let item = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite",
            "3",
            connection_string.as_str(),
            "SELECT id FROM probes WHERE id > 100",
        ))
        .await
        .unwrap();

    assert!(item.results.is_empty());
}

#[tokio::test]
async fn test_text_in_real_column_coerces_to_zero() {
    let (dir, connection_string) = seeded_database().await;

    let options = SqliteConnectOptions::new().filename(dir.path().join("probe.db"));
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::raw_sql("UPDATE probes SET ratio = 'aaé' WHERE id = 2")
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();

    let item = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite",
            "3",
            connection_string.as_str(),
            "SELECT ratio FROM probes WHERE id = 2",
        ))
        .await
        .unwrap();

    assert_eq!(
        item.results[0].fields,
        vec![ResultField::new("ratio", FieldValue::Float(0.0))]
    );
}

#[tokio::test]
async fn test_query_error() {
    let (_dir, connection_string) = seeded_database().await;

    let err = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite",
            "3",
            connection_string.as_str(),
            "SELECT * FROM missing_table",
        ))
        .await
        .unwrap_err();

    match err {
        ProbeError::Query { sql, .. } => assert_eq!(sql, "SELECT * FROM missing_table"),
        other => panic!("Expected query error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_database_is_bind_error() {
    let err = Evaluator::default()
        .evaluate(QueryRequest::new("sqlite", "3", "Server=ignored", "SELECT 1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::Bind { .. }));
}

#[tokio::test]
async fn test_output_json_shape() {
    let (_dir, connection_string) = seeded_database().await;

    let item = Evaluator::default()
        .evaluate(QueryRequest::new(
            "sqlite",
            "3",
            connection_string.as_str(),
            "SELECT label FROM probes WHERE id = 1",
        ))
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(item.to_json(false).unwrap().expose()).unwrap();
    assert_eq!(json["engine"], "sqlite");
    assert_eq!(json["version"], "3");
    assert_eq!(json["sql"], "SELECT label FROM probes WHERE id = 1");
    assert_eq!(json["connection_string"], connection_string.as_str());
    assert_eq!(
        json["results"][0]["fields"][0],
        serde_json::json!({"name": "label", "type": "string", "value": "alpha"})
    );
}

#[test]
fn test_evaluate_blocking() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocking.db");
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(seed(&path));
    drop(runtime);

    let item = Evaluator::default()
        .evaluate_blocking(QueryRequest::new(
            "sqlite",
            "3",
            format!("Database={}", path.display()),
            "SELECT COUNT(*) AS total FROM probes",
        ))
        .unwrap();

    assert_eq!(
        item.results[0].fields,
        vec![ResultField::new("total", FieldValue::Integer(2))]
    );
}
