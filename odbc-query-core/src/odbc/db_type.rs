//! Supported database technologies.

use crate::odbc::Error;
use crate::odbc::placeholder::QuoteEscape;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The database technology a connection targets.
///
/// Determines the driver name and the connection string grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DbType {
    /// Microsoft SQL Server (FreeTDS or the Microsoft driver)
    Mssql,
    /// MySQL / MariaDB
    Mysql,
    /// Oracle through the instant client driver. Experimental.
    Oracle,
}

impl DbType {
    /// All supported types, in the order they are reported to users.
    pub const ALL: [DbType; 3] = [DbType::Mssql, DbType::Mysql, DbType::Oracle];

    pub const fn name(self) -> &'static str {
        match self {
            DbType::Mssql => "mssql",
            DbType::Mysql => "mysql",
            DbType::Oracle => "oracle",
        }
    }

    /// Driver used when the system ODBC configuration does not register one.
    pub const fn default_driver(self) -> &'static str {
        match self {
            DbType::Mssql => "{FreeTDS}",
            DbType::Mysql => "{MySQL ODBC 8.0 Unicode Driver}",
            DbType::Oracle => "{Oracle 19 ODBC driver}",
        }
    }

    /// Escaping of quotes inside string literals in this dialect.
    pub const fn quote_escape(self) -> QuoteEscape {
        match self {
            DbType::Mysql => QuoteEscape::Backslash,
            DbType::Mssql | DbType::Oracle => QuoteEscape::Doubled,
        }
    }

    /// Patterns matched against `odbcinst.ini` section names, most preferred first.
    pub(crate) const fn driver_patterns(self) -> &'static [&'static str] {
        match self {
            DbType::Mssql => &["freetds", "sql server"],
            DbType::Mysql => &["mysql"],
            DbType::Oracle => &["oracle"],
        }
    }

    pub fn supported_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.name()).collect()
    }
}

impl Display for DbType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.pad(self.name())
    }
}

impl FromStr for DbType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| Error::UnsupportedDbType {
                given: s.to_string(),
                supported: Self::supported_names(),
            })
    }
}
