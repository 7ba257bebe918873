//! Execution options.

use crate::odbc::DuplicateColumns;
use std::time::Duration;

/// Buffer settings for fetching cell data.
#[derive(Debug, Clone)]
pub struct OdbcBufferSettings {
    /// Initial buffer size for text/binary cells; longer values are still read in full
    pub max_column_size: usize,
}

impl Default for OdbcBufferSettings {
    fn default() -> Self {
        Self {
            max_column_size: 4096,
        }
    }
}

/// Options for executing one statement.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Buffer settings for data fetching
    pub(crate) buffer_settings: OdbcBufferSettings,
    /// Login timeout handed to the driver manager
    pub(crate) login_timeout: Option<Duration>,
    /// Statement timeout
    pub(crate) query_timeout: Option<Duration>,
    /// Autocommit mode of the connection
    pub(crate) autocommit: bool,
    /// How duplicate column names are normalized
    pub(crate) duplicate_columns: DuplicateColumns,
    /// Statement logging level
    pub(crate) log_statements: log::LevelFilter,
    /// Slow statement threshold
    pub(crate) log_slow_statements: (log::LevelFilter, Duration),
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            buffer_settings: OdbcBufferSettings::default(),
            login_timeout: Some(Duration::from_secs(30)),
            query_timeout: None,
            autocommit: true,
            duplicate_columns: DuplicateColumns::default(),
            log_statements: log::LevelFilter::Debug,
            log_slow_statements: (log::LevelFilter::Warn, Duration::from_secs(1)),
        }
    }
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer settings
    pub fn buffer_settings(mut self, settings: OdbcBufferSettings) -> Self {
        self.buffer_settings = settings;
        self
    }

    /// Set the initial cell buffer size
    pub fn max_column_size(mut self, size: usize) -> Self {
        self.buffer_settings.max_column_size = size;
        self
    }

    /// Set the login timeout (`None` leaves the driver default)
    pub fn login_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Set the statement timeout (`None` waits indefinitely)
    pub fn query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    pub fn duplicate_columns(mut self, policy: DuplicateColumns) -> Self {
        self.duplicate_columns = policy;
        self
    }

    pub fn log_statements(mut self, level: log::LevelFilter) -> Self {
        self.log_statements = level;
        self
    }

    pub fn log_slow_statements(mut self, level: log::LevelFilter, duration: Duration) -> Self {
        self.log_slow_statements = (level, duration);
        self
    }

    pub fn get_login_timeout(&self) -> Option<Duration> {
        self.login_timeout
    }

    pub fn get_query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    pub fn get_duplicate_columns(&self) -> DuplicateColumns {
        self.duplicate_columns
    }

    pub fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn get_max_column_size(&self) -> usize {
        self.buffer_settings.max_column_size
    }
}
