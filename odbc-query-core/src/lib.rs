//! Core of odbc-query.
//!
//! Resolves connection parameters, builds ODBC connection strings for
//! SQL Server, MySQL and Oracle, executes one parameterized statement per
//! connection and normalizes the rows into column-name mappings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use odbc_query_core::odbc::{ConnectionFields, Pipeline, QueryExecutor, QuerySpec, SystemCatalog};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), odbc_query_core::odbc::Error> {
//! let pipeline = Pipeline::new(Arc::new(SystemCatalog::load()?), QueryExecutor::default());
//! let explicit = ConnectionFields::new()
//!     .servername("mysql-server.domain.com")
//!     .database("db_test")
//!     .username("sa")
//!     .password("Passw0rd")
//!     .dbtype("mysql");
//! let query = QuerySpec::new("select * from t where col = ?").bind("x");
//! let outcome = pipeline.run(&explicit, &ConnectionFields::new(), query).await?;
//! # Ok(())
//! # }
//! ```

pub mod odbc;

// Re-export main types at crate root for convenience
pub use odbc::{
    ConnectionDescriptor, ConnectionFields, ConnectionString, ConnectionStringBuilder, DbType,
    DriverError, DuplicateColumns, Error, ExecuteOptions, NormalizedOutcome, NormalizedRow,
    OdbcBackend, OdbcCatalog, OdbcValue, ParameterResolver, Pipeline, QueryBackend,
    QueryExecutor, QueryOutcome, QuerySpec, Result, ResultSet, StaticCatalog, SystemCatalog,
};
