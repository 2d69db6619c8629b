//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    autoflowx_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["principal", "identity_session", "profile", "client"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let first = autoflowx_db::run_migrations(&db).await.unwrap();
    assert_eq!(first, vec![1, 2]);
    let second = autoflowx_db::run_migrations(&db).await.unwrap();
    assert!(second.is_empty());

    let mut result = db
        .query("SELECT count() AS total FROM _migration GROUP ALL")
        .await
        .unwrap();
    let counts: Vec<CountRow> = result.take(0).unwrap();
    assert_eq!(counts[0].total, 2);
}

#[tokio::test]
async fn failed_migration_is_reported_and_not_recorded() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    autoflowx_db::run_migrations(&db).await.unwrap();
    db.query("DELETE _migration WHERE version = 2")
        .await
        .unwrap()
        .check()
        .unwrap();

    // v2's indexes already exist, so re-applying it fails.
    let err = autoflowx_db::run_migrations(&db).await.unwrap_err();
    assert!(err.to_string().contains("v2"), "unexpected error: {err}");

    let mut result = db
        .query("SELECT count() AS total FROM _migration GROUP ALL")
        .await
        .unwrap();
    let counts: Vec<CountRow> = result.take(0).unwrap();
    assert_eq!(counts[0].total, 1);
}
