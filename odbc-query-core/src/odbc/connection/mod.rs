//! ODBC connection handling.
//!
//! Every statement gets its own connection: it is opened, used once and
//! released when it goes out of scope, whether the statement succeeded or
//! not. Nothing is pooled between invocations.

use crate::odbc::type_info::{CellKind, data_type_name};
use crate::odbc::{
    ConnectionString, ExecuteOptions, OdbcValue, QueryOutcome, QuerySpec, Result, ResultSet,
};
use odbc_api::{Cursor, Environment};
use std::sync::OnceLock;

mod executor;

pub use executor::QueryExecutor;

// Global ODBC environment, created on first use
static ODBC_ENV: OnceLock<Environment> = OnceLock::new();

fn odbc_environment() -> Result<&'static Environment> {
    if let Some(env) = ODBC_ENV.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    Ok(ODBC_ENV.get_or_init(|| env))
}

/// Executes one statement over one fresh connection.
///
/// The seam between the pipeline and the driver manager; tests substitute
/// their own implementation.
pub trait QueryBackend: Send + Sync + 'static {
    fn run(
        &self,
        connection_string: &ConnectionString,
        query: &QuerySpec,
        options: &ExecuteOptions,
    ) -> Result<QueryOutcome>;
}

/// The production backend, talking to the system ODBC driver manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdbcBackend;

impl QueryBackend for OdbcBackend {
    fn run(
        &self,
        connection_string: &ConnectionString,
        query: &QuerySpec,
        options: &ExecuteOptions,
    ) -> Result<QueryOutcome> {
        let env = odbc_environment()?;

        let connection_options = odbc_api::ConnectionOptions {
            login_timeout_sec: options
                .login_timeout
                .map(|t| u32::try_from(t.as_secs()).unwrap_or(u32::MAX)),
            ..Default::default()
        };
        let conn =
            env.connect_with_connection_string(&connection_string.to_string(), connection_options)?;
        log::debug!("connected: {}", connection_string.redacted());

        if !options.autocommit {
            conn.set_autocommit(false)?;
        }

        let params = query.to_parameters();
        let mut statement = conn.preallocate()?;
        if let Some(timeout) = options.query_timeout {
            let secs = usize::try_from(timeout.as_secs()).unwrap_or(usize::MAX);
            statement.set_query_timeout_sec(secs)?;
        }

        let result_set = {
            let cursor = statement.execute(query.sql(), params.as_slice())?;
            match cursor {
                Some(cursor) => Some(read_result_set(cursor, options)?),
                None => None,
            }
        };

        let outcome = match result_set {
            Some(set) => QueryOutcome::Rows(set),
            None => {
                let count = statement.row_count()?.unwrap_or(0);
                QueryOutcome::Affected(count as u64)
            }
        };
        drop(statement);

        if !options.autocommit {
            conn.commit()?;
        }
        Ok(outcome)
    }
}

/// Fetch every row of `cursor`, reading each cell according to its column type.
fn read_result_set(mut cursor: impl Cursor, options: &ExecuteOptions) -> Result<ResultSet> {
    let num_cols = cursor.num_result_cols()?.max(0) as u16;

    let mut columns = Vec::with_capacity(num_cols as usize);
    let mut kinds = Vec::with_capacity(num_cols as usize);
    for i in 1..=num_cols {
        let name = cursor.col_name(i)?;
        let data_type = cursor.col_data_type(i)?;
        log::trace!("column {} {} {}", i, name, data_type_name(data_type));
        columns.push(name);
        kinds.push(CellKind::of(data_type));
    }

    let mut set = ResultSet::new(columns);
    let mut buf = Vec::with_capacity(options.buffer_settings.max_column_size);
    while let Some(mut row) = cursor.next_row()? {
        let mut values = Vec::with_capacity(kinds.len());
        for (i, kind) in (1..=num_cols).zip(&kinds) {
            let value = if *kind == CellKind::Binary {
                if row.get_binary(i, &mut buf)? {
                    OdbcValue::Binary(buf.clone())
                } else {
                    OdbcValue::Null
                }
            } else if row.get_text(i, &mut buf)? {
                decode_text(*kind, String::from_utf8_lossy(&buf).into_owned())
            } else {
                OdbcValue::Null
            };
            values.push(value);
        }
        set.push_row(values);
    }

    Ok(set)
}

/// Interpret a cell's text representation according to its column kind.
///
/// Falls back to text whenever the driver's rendering does not parse.
pub fn decode_text(kind: CellKind, text: String) -> OdbcValue {
    match kind {
        CellKind::Integer => match text.trim().parse() {
            Ok(i) => OdbcValue::Int(i),
            Err(_) => OdbcValue::Text(text),
        },
        CellKind::Float => match text.trim().parse() {
            Ok(f) => OdbcValue::Float(f),
            Err(_) => OdbcValue::Text(text),
        },
        CellKind::Bool => {
            let trimmed = text.trim();
            if trimmed == "1" {
                OdbcValue::Bool(true)
            } else if trimmed == "0" {
                OdbcValue::Bool(false)
            } else {
                OdbcValue::Text(text)
            }
        }
        CellKind::Binary | CellKind::Text => OdbcValue::Text(text),
    }
}
