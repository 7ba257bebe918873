//! Error types for the query pipeline.

use odbc_api::Error as OdbcApiError;
use regex::Regex;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a single query invocation can fail.
///
/// All variants are terminal for the invocation: nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required connection field is absent after merging all sources.
    #[error("Missing configuration parameters: [{}]", .missing.join(", "))]
    MissingParameter { missing: Vec<String> },

    /// The `dbtype` value is not one of the supported database types.
    #[error("DB type must be one of [{}], got '{given}'", .supported.join(", "))]
    UnsupportedDbType {
        given: String,
        supported: Vec<&'static str>,
    },

    /// The number of `?` placeholders does not match the number of values.
    #[error("Query has {expected} placeholder(s) but {given} value(s) were supplied")]
    ParameterCount { expected: usize, given: usize },

    /// Anything reported by the driver manager or the driver itself.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A result set repeats a column name and the normalizer was told to reject it.
    #[error("Result set contains duplicate column '{name}'")]
    DuplicateColumn { name: String },

    /// An ODBC configuration file exists but could not be parsed.
    #[error("Cannot read ODBC configuration {path}: {message}")]
    Catalog { path: String, message: String },

    /// A query value or option value cannot be bound.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The blocking worker running the ODBC calls panicked.
    #[error("ODBC worker thread crashed")]
    WorkerCrashed,
}

impl Error {
    /// Short, stable category name reported to the calling automation task.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingParameter { .. } => "missing_parameter",
            Error::UnsupportedDbType { .. } => "unsupported_db_type",
            Error::ParameterCount { .. } => "parameter_count",
            Error::Driver(_) => "driver",
            Error::DuplicateColumn { .. } => "duplicate_column",
            Error::Catalog { .. } => "catalog",
            Error::InvalidParameter(_) => "invalid_parameter",
            Error::WorkerCrashed => "worker_crashed",
        }
    }
}

impl From<OdbcApiError> for Error {
    fn from(error: OdbcApiError) -> Self {
        Error::Driver(DriverError::new(error))
    }
}

/// An error returned from the ODBC driver manager or a driver.
///
/// The message is kept exactly as the driver produced it.
#[derive(Debug)]
pub struct DriverError {
    pub(crate) inner: Option<OdbcApiError>,
    pub(crate) message: String,
    pub(crate) sqlstate: Option<String>,
    pub(crate) native_error: Option<i32>,
}

impl DriverError {
    /// Create a new DriverError from an odbc_api::Error
    pub fn new(error: OdbcApiError) -> Self {
        let message = error.to_string();
        let sqlstate = extract_sqlstate(&message);
        let native_error = extract_native_error(&message);
        Self {
            inner: Some(error),
            message,
            sqlstate,
            native_error,
        }
    }

    /// Build an error from a diagnostic message alone.
    ///
    /// Used by backends that do not go through `odbc_api`.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            inner: None,
            sqlstate: extract_sqlstate(&message),
            native_error: extract_native_error(&message),
            message,
        }
    }

    /// The driver's diagnostic text, unchanged.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the SQLSTATE code if available
    pub fn sqlstate(&self) -> Option<&str> {
        self.sqlstate.as_deref()
    }

    /// Driver specific native error code, if reported.
    pub fn native_error(&self) -> Option<i32> {
        self.native_error
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.message)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

static STATE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"State: ([0-9A-Z]{5})").ok());
static BRACKET_STATE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([0-9A-Z]{5})\]").ok());
static NATIVE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Native error: (-?\d+)").ok());

/// Extract SQLSTATE from a diagnostic message.
///
/// `odbc_api` renders records as `State: 08001, Native error: 0, Message: ...`;
/// some drivers embed the state as `[42S02]` instead.
fn extract_sqlstate(message: &str) -> Option<String> {
    [&*STATE_RE, &*BRACKET_STATE_RE]
        .into_iter()
        .flatten()
        .find_map(|re| re.captures(message))
        .map(|caps| caps[1].to_string())
}

fn extract_native_error(message: &str) -> Option<i32> {
    NATIVE_RE
        .as_ref()?
        .captures(message)
        .and_then(|caps| caps[1].parse().ok())
}
