//! odbc-query
//!
//! Runs one parameterized SQL statement against SQL Server, MySQL or Oracle
//! through the system ODBC driver manager, for use as an automation task.
//!
//! ## Features
//!
//! - **Parameter merging** - explicit fields override a shared `config` mapping,
//!   which overrides DSN defaults
//! - **Driver discovery** - picks the newest registered driver per database type
//! - **Positional values** - `?` placeholders are bound, never interpolated
//! - **Normalized rows** - results come back as ordered column-name mappings
//!
//! ## Example
//!
//! ```rust,no_run
//! use odbc_query::{ModuleArgs, run_module};
//! use odbc_query::odbc::{Pipeline, QueryExecutor, SystemCatalog};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), odbc_query::odbc::Error> {
//! let args = ModuleArgs::from_json(r#"{
//!     "dsn": "some_server",
//!     "username": "root",
//!     "password": "root",
//!     "query": "select * from table where col = ?",
//!     "values": ["a"]
//! }"#)?;
//! let pipeline = Pipeline::new(Arc::new(SystemCatalog::load()?), QueryExecutor::default());
//! let result = run_module(&args, &pipeline).await;
//! println!("{}", result.to_json());
//! # Ok(())
//! # }
//! ```

mod module;

pub use module::{AnsibleFacts, ModuleArgs, ModuleResult, run_module};

// Re-export everything from odbc-query-core
pub use odbc_query_core::*;
