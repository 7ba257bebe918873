//! Driver-specific connection string construction.

use crate::odbc::catalog::OdbcCatalog;
use crate::odbc::{ConnectionDescriptor, DbType, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// TDS protocol version sent to FreeTDS; 7.3 covers SQL Server 2008 onwards.
const FREETDS_TDS_VERSION: &str = "7.3";

const ORACLE_DEFAULT_PORT: u16 = 1521;

/// An ordered list of `KEY=VALUE` attributes.
///
/// Keys compare case-insensitively: setting a key that is already present
/// replaces its value in place. Values given to [`set`](Self::set) are
/// escaped on rendering; only [`set_raw`](Self::set_raw) writes a value
/// verbatim.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pairs: Vec<Attribute>,
}

#[derive(Clone, PartialEq, Eq)]
struct Attribute {
    key: String,
    value: String,
    verbatim: bool,
}

impl ConnectionString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, keeping the position of an existing key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.insert(key.into(), value.into(), false)
    }

    /// Set an attribute whose value is already in connection string syntax.
    pub fn set_raw(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.insert(key.into(), value.into(), true)
    }

    fn insert(&mut self, key: String, value: String, verbatim: bool) -> &mut Self {
        match self
            .pairs
            .iter_mut()
            .find(|attr| attr.key.eq_ignore_ascii_case(&key))
        {
            Some(slot) => {
                slot.value = value;
                slot.verbatim = verbatim;
            }
            None => self.pairs.push(Attribute {
                key,
                value,
                verbatim,
            }),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|attr| attr.key.eq_ignore_ascii_case(key))
            .map(|attr| attr.value.as_str())
    }

    pub fn pairs(&self) -> impl ExactSizeIterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|attr| (attr.key.as_str(), attr.value.as_str()))
    }

    /// Rendering with the password replaced, for logs.
    pub fn redacted(&self) -> String {
        let mut out = String::new();
        for attr in &self.pairs {
            if attr.key.eq_ignore_ascii_case("PWD") {
                push_attribute(&mut out, &attr.key, "***");
            } else {
                push_attribute(&mut out, &attr.key, &attr.rendered_value());
            }
        }
        out
    }
}

impl Attribute {
    fn rendered_value(&self) -> String {
        if self.verbatim {
            self.value.clone()
        } else {
            escape_value(&self.value)
        }
    }
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    out.push_str(value);
    out.push(';');
}

/// Brace a value that would otherwise end the attribute early or be read
/// as a braced value. Closing braces inside are doubled.
fn escape_value(value: &str) -> String {
    if value.contains(';') || value.contains('}') || value.starts_with('{') {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

impl Display for ConnectionString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut out = String::new();
        for attr in &self.pairs {
            push_attribute(&mut out, &attr.key, &attr.rendered_value());
        }
        f.write_str(&out)
    }
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("ConnectionString")
            .field(&self.redacted())
            .finish()
    }
}

/// Authentication mode chosen for SQL Server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MssqlAuth {
    /// SQL Server login
    Sql,
    /// Active Directory account given as `DOMAIN\user`
    Domain,
}

/// Turns a resolved descriptor into a driver connection string.
pub struct ConnectionStringBuilder<'a> {
    catalog: &'a dyn OdbcCatalog,
}

impl<'a> ConnectionStringBuilder<'a> {
    pub fn new(catalog: &'a dyn OdbcCatalog) -> Self {
        Self { catalog }
    }

    pub fn build(&self, descriptor: &ConnectionDescriptor) -> Result<ConnectionString> {
        let mut conn = ConnectionString::new();

        match descriptor.dsn() {
            Some(dsn) => {
                conn.set("DSN", dsn);
                if let Some(driver) = descriptor.driver() {
                    conn.set_raw("DRIVER", braced(driver));
                }
                conn.set("UID", descriptor.username());
                conn.set("PWD", descriptor.password());
            }
            None => {
                let db_type: DbType = descriptor.dbtype().unwrap_or_default().parse()?;
                let driver = self.driver_for(descriptor, db_type);
                match db_type {
                    DbType::Mssql => mssql(&mut conn, descriptor, &driver),
                    DbType::Mysql => mysql(&mut conn, descriptor, &driver),
                    DbType::Oracle => oracle(&mut conn, descriptor, &driver),
                }
            }
        }

        for (key, value) in descriptor.options() {
            conn.set(key.clone(), value.clone());
        }

        log::debug!("connection string: {}", conn.redacted());
        Ok(conn)
    }

    /// Explicit driver, else the catalog's preferred driver, else the built-in name.
    fn driver_for(&self, descriptor: &ConnectionDescriptor, db_type: DbType) -> String {
        let driver = descriptor
            .driver()
            .map(str::to_string)
            .or_else(|| self.catalog.driver_for(db_type))
            .unwrap_or_else(|| db_type.default_driver().to_string());
        braced(&driver)
    }
}

/// Driver names are always written braced; an already braced name is
/// unwrapped first so it is not braced twice.
fn braced(driver: &str) -> String {
    let name = driver
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(driver);
    format!("{{{}}}", name.replace('}', "}}"))
}

pub fn mssql_auth(descriptor: &ConnectionDescriptor) -> MssqlAuth {
    if descriptor.is_domain_user() {
        MssqlAuth::Domain
    } else {
        MssqlAuth::Sql
    }
}

fn mssql(conn: &mut ConnectionString, descriptor: &ConnectionDescriptor, driver: &str) {
    conn.set_raw("DRIVER", driver);
    // `host\INSTANCE` is passed through; both drivers resolve named instances.
    conn.set("SERVER", descriptor.servername().unwrap_or_default());
    if let Some(port) = descriptor.port() {
        conn.set("PORT", port.to_string());
    }
    if driver.to_ascii_lowercase().contains("freetds") {
        conn.set("TDS_Version", FREETDS_TDS_VERSION);
    }
    conn.set("DATABASE", descriptor.database().unwrap_or_default());
    conn.set("UID", descriptor.username());
    conn.set("PWD", descriptor.password());

    let auth = mssql_auth(descriptor);
    log::debug!("SQL Server authentication: {:?}", auth);
    if auth == MssqlAuth::Domain {
        conn.set("UseNTLMv2", "Yes");
    }
}

fn mysql(conn: &mut ConnectionString, descriptor: &ConnectionDescriptor, driver: &str) {
    conn.set_raw("DRIVER", driver);
    conn.set("SERVER", descriptor.servername().unwrap_or_default());
    if let Some(port) = descriptor.port() {
        conn.set("PORT", port.to_string());
    }
    conn.set("DATABASE", descriptor.database().unwrap_or_default());
    conn.set("UID", descriptor.username());
    conn.set("PWD", descriptor.password());
}

fn oracle(conn: &mut ConnectionString, descriptor: &ConnectionDescriptor, driver: &str) {
    let dbq = format!(
        "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={})(PORT={}))(CONNECT_DATA=(SID={})))",
        descriptor.servername().unwrap_or_default(),
        descriptor.port().unwrap_or(ORACLE_DEFAULT_PORT),
        descriptor.database().unwrap_or_default(),
    );
    conn.set_raw("DRIVER", driver);
    conn.set("DBQ", dbq);
    conn.set("UID", descriptor.username());
    conn.set("PWD", descriptor.password());
}
