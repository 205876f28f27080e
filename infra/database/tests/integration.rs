use vhub_database::*;

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    // Health should be OK for mem://
    db.health().await.expect("health check");
    db.use_ns("test_ns").use_db("test_db").await.expect("session switch");

    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn migrations_record_applied_versions() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "migrations_db")
        .init()
        .await
        .expect("init applies migrations");

    // Counting applied migrations proves the bootstrap ran.
    let mut response =
        db.query("(SELECT VALUE count() FROM migration GROUP ALL)[0]").await.expect("query");
    let count = response.take::<Option<i64>>(0).expect("take").unwrap_or_default();
    assert!(count > 0, "expected at least the bootstrap migration to be recorded");
}
