//! Live tests against a real database through the system driver manager.
//!
//! These need a reachable server and an installed ODBC driver, so they are
//! ignored by default. Point them at a SQL Server instance with
//!
//! ```text
//! ODBC_QUERY_SERVER=localhost ODBC_QUERY_USERNAME=sa ODBC_QUERY_PASSWORD=... \
//!     cargo test -p odbc-query-core --test connection_tests -- --ignored
//! ```

use odbc_query_core::odbc::{
    ConnectionFields, ExecuteOptions, OdbcValue, Pipeline, QueryExecutor, QuerySpec,
    SystemCatalog,
};
use std::sync::Arc;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn live_fields() -> ConnectionFields {
    ConnectionFields::new()
        .servername(env_or("ODBC_QUERY_SERVER", "localhost"))
        .database(env_or("ODBC_QUERY_DATABASE", "master"))
        .username(env_or("ODBC_QUERY_USERNAME", "sa"))
        .password(env_or("ODBC_QUERY_PASSWORD", "YourStrong@Passw0rd"))
        .dbtype(env_or("ODBC_QUERY_DBTYPE", "mssql"))
        .option("TrustServerCertificate", "yes")
}

fn pipeline() -> Pipeline {
    let catalog = SystemCatalog::load().expect("Failed to read ODBC configuration");
    let options = ExecuteOptions::new().login_timeout(Some(Duration::from_secs(5)));
    Pipeline::new(
        Arc::new(catalog),
        QueryExecutor::default().with_options(options),
    )
}

#[tokio::test]
#[ignore = "requires a running database"]
async fn test_select_with_values() {
    let outcome = pipeline()
        .run(
            &live_fields(),
            &ConnectionFields::new(),
            QuerySpec::new("SELECT CAST(? AS INT) AS id, CAST(? AS VARCHAR(10)) AS name")
                .bind(7)
                .bind("seven"),
        )
        .await
        .expect("query should succeed");

    let rows = outcome.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id"), Some(&OdbcValue::Int(7)));
    assert_eq!(rows[0].get("name").and_then(OdbcValue::as_text), Some("seven"));
}

#[tokio::test]
#[ignore = "requires a running database"]
async fn test_invalid_credentials() {
    let fields = live_fields().password("definitely wrong");
    let error = pipeline()
        .run(&fields, &ConnectionFields::new(), QuerySpec::new("SELECT 1"))
        .await
        .expect_err("login must fail");

    assert_eq!(error.kind(), "driver");
}

#[tokio::test]
#[ignore = "requires a running database"]
async fn test_statement_without_rows() {
    let outcome = pipeline()
        .run(
            &live_fields(),
            &ConnectionFields::new(),
            QuerySpec::new("DECLARE @x INT = ?").bind(1),
        )
        .await
        .expect("statement should succeed");

    assert!(outcome.rows_affected().is_some());
    assert!(outcome.rows().is_empty());
}
