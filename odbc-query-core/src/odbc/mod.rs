//! ODBC query pipeline.
//!
//! A query invocation runs four stages in order:
//!
//! 1. [`ParameterResolver`] merges explicit fields, a configuration mapping
//!    and DSN defaults into a [`ConnectionDescriptor`].
//! 2. [`ConnectionStringBuilder`] turns the descriptor into a driver
//!    specific [`ConnectionString`].
//! 3. [`QueryExecutor`] opens one connection, runs the statement with its
//!    positional values and closes the connection again.
//! 4. [`normalize`] zips column names with each row.
//!
//! ## Connection Strings
//!
//! ```text
//! // DSN-based connection
//! DSN=some_server;UID=root;PWD=root;
//!
//! // SQL Server through FreeTDS
//! DRIVER={FreeTDS};SERVER=server.domain.com\instance;TDS_Version=7.3;DATABASE=db_test;UID=sa;PWD=Passw0rd;
//! ```

mod arguments;
pub mod catalog;
mod connection;
mod connection_string;
mod db_type;
mod descriptor;
mod error;
mod options;
mod pipeline;
pub mod placeholder;
mod result_set;
mod row;
mod type_info;
mod value;

pub use arguments::QuerySpec;
pub use catalog::{DsnEntry, OdbcCatalog, StaticCatalog, SystemCatalog};
pub use connection::{OdbcBackend, QueryBackend, QueryExecutor, decode_text};
pub use connection_string::{ConnectionString, ConnectionStringBuilder, MssqlAuth, mssql_auth};
pub use db_type::DbType;
pub use descriptor::{ConnectionDescriptor, ConnectionFields, ParameterResolver};
pub use error::{DriverError, Error, Result};
pub use options::{ExecuteOptions, OdbcBufferSettings};
pub use pipeline::{NormalizedOutcome, Pipeline};
pub use placeholder::QuoteEscape;
pub use result_set::{QueryOutcome, ResultSet};
pub use row::{DuplicateColumns, NormalizedRow, normalize};
pub use type_info::{CellKind, DataTypeExt, data_type_name};
pub use value::OdbcValue;
