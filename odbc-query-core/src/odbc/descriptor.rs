//! Connection parameters and their resolution.
//!
//! Parameters arrive from three places: fields given explicitly with the
//! task, an optional configuration mapping shared between tasks, and the
//! defaults registered for a DSN. [`ParameterResolver`] merges them with a
//! fixed precedence: explicit > configuration > DSN default.

use crate::odbc::catalog::{DsnEntry, OdbcCatalog};
use crate::odbc::placeholder::QuoteEscape;
use crate::odbc::{DbType, Error, Result};
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Which named field a mapping key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Dsn,
    Servername,
    Port,
    Database,
    Username,
    Password,
    DbType,
    Driver,
}

impl Field {
    fn from_key(key: &str) -> Option<Field> {
        match key.to_ascii_lowercase().as_str() {
            "dsn" => Some(Field::Dsn),
            "servername" | "server" => Some(Field::Servername),
            "port" => Some(Field::Port),
            "database" | "db" => Some(Field::Database),
            "username" | "user" | "uid" => Some(Field::Username),
            "password" | "pwd" => Some(Field::Password),
            "dbtype" => Some(Field::DbType),
            "driver" => Some(Field::Driver),
            _ => None,
        }
    }
}

/// One layer of optional connection fields.
///
/// Empty strings are treated as absent. Unknown keys given through
/// [`ConnectionFields::from_mapping`] become extra connection options.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionFields {
    pub dsn: Option<String>,
    pub servername: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub dbtype: Option<String>,
    pub driver: Option<String>,
    options: Vec<(String, String)>,
}

impl ConnectionFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layer from an open string mapping such as a task's `config`.
    pub fn from_mapping<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = Self::new();
        for (key, value) in mapping {
            fields.set(key.as_ref(), value);
        }
        fields
    }

    /// Set a named field, or an extra option when the key is not a field name.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = non_empty(value.into());
        match Field::from_key(key) {
            Some(Field::Dsn) => self.dsn = value,
            Some(Field::Servername) => self.servername = value,
            Some(Field::Port) => self.port = value,
            Some(Field::Database) => self.database = value,
            Some(Field::Username) => self.username = value,
            Some(Field::Password) => self.password = value,
            Some(Field::DbType) => self.dbtype = value,
            Some(Field::Driver) => self.driver = value,
            None => {
                if let Some(value) = value {
                    self.set_option(key, value);
                }
            }
        }
    }

    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = non_empty(dsn.into());
        self
    }

    pub fn servername(mut self, servername: impl Into<String>) -> Self {
        self.servername = non_empty(servername.into());
        self
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = non_empty(port.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = non_empty(database.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = non_empty(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = non_empty(password.into());
        self
    }

    pub fn dbtype(mut self, dbtype: impl Into<String>) -> Self {
        self.dbtype = non_empty(dbtype.into());
        self
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = non_empty(driver.into());
        self
    }

    /// Add an extra `KEY=VALUE` connection option, replacing an existing
    /// option with the same key (compared case-insensitively).
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_option(key, value);
        self
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .options
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.options.push((key, value)),
        }
    }

    /// Extra options in insertion order.
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Merge `higher` over `self`: every field set in `higher` wins.
    pub fn overlay(mut self, higher: &ConnectionFields) -> Self {
        fn pick(lower: &mut Option<String>, higher: &Option<String>) {
            if higher.is_some() {
                lower.clone_from(higher);
            }
        }
        pick(&mut self.dsn, &higher.dsn);
        pick(&mut self.servername, &higher.servername);
        pick(&mut self.port, &higher.port);
        pick(&mut self.database, &higher.database);
        pick(&mut self.username, &higher.username);
        pick(&mut self.password, &higher.password);
        pick(&mut self.dbtype, &higher.dbtype);
        pick(&mut self.driver, &higher.driver);
        for (key, value) in &higher.options {
            self.set_option(key.clone(), value.clone());
        }
        self
    }
}

impl Debug for ConnectionFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConnectionFields")
            .field("dsn", &self.dsn)
            .field("servername", &self.servername)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("dbtype", &self.dbtype)
            .field("driver", &self.driver)
            .field("options", &self.options)
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

/// A fully resolved set of connection parameters.
///
/// Produced only by [`ParameterResolver::resolve`], so every field required
/// by the chosen path (DSN or driver) is present.
///
/// Server, port and database registered for a DSN fill the gaps in
/// [`servername`](Self::servername), [`port`](Self::port) and
/// [`database`](Self::database) for logging and inspection only. A DSN
/// connection string never repeats them; the driver manager applies them
/// itself. The DSN's registered driver does take part in choosing the
/// [`quote_escape`](Self::quote_escape) dialect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub(crate) fields: ConnectionFields,
    pub(crate) dsn_defaults: Option<DsnEntry>,
}

impl ConnectionDescriptor {
    pub fn dsn(&self) -> Option<&str> {
        self.fields.dsn.as_deref()
    }

    /// Explicit or configured server, else the DSN's registered one.
    pub fn servername(&self) -> Option<&str> {
        self.fields.servername.as_deref().or_else(|| {
            self.dsn_defaults
                .as_ref()
                .and_then(|d| d.server.as_deref())
        })
    }

    pub fn port(&self) -> Option<u16> {
        self.fields
            .port
            .as_deref()
            .or_else(|| self.dsn_defaults.as_ref().and_then(|d| d.port.as_deref()))
            .and_then(|p| p.trim().parse().ok())
    }

    pub fn database(&self) -> Option<&str> {
        self.fields.database.as_deref().or_else(|| {
            self.dsn_defaults
                .as_ref()
                .and_then(|d| d.database.as_deref())
        })
    }

    pub fn username(&self) -> &str {
        self.fields.username.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.fields.password.as_deref().unwrap_or_default()
    }

    pub fn dbtype(&self) -> Option<&str> {
        self.fields.dbtype.as_deref()
    }

    /// Driver given explicitly or through the configuration mapping.
    pub fn driver(&self) -> Option<&str> {
        self.fields.driver.as_deref()
    }

    /// Driver registered for the DSN, if any.
    pub fn dsn_driver(&self) -> Option<&str> {
        self.dsn_defaults
            .as_ref()
            .and_then(|d| d.driver.as_deref())
    }

    pub fn options(&self) -> &[(String, String)] {
        self.fields.options()
    }

    /// String literal escaping of the target database.
    ///
    /// A driver name (explicit, else the DSN's) decides when present, since
    /// a DSN connection ignores `dbtype`; otherwise `dbtype` does.
    pub fn quote_escape(&self) -> QuoteEscape {
        match self.driver().or_else(|| self.dsn_driver()) {
            Some(driver) => {
                let driver = driver.to_ascii_lowercase();
                if driver.contains("mysql") || driver.contains("mariadb") {
                    QuoteEscape::Backslash
                } else {
                    QuoteEscape::Doubled
                }
            }
            None => self
                .dbtype()
                .and_then(|name| name.parse::<DbType>().ok())
                .map(DbType::quote_escape)
                .unwrap_or_default(),
        }
    }

    /// Whether the username names a domain account (`DOMAIN\user`).
    pub fn is_domain_user(&self) -> bool {
        self.username().contains('\\')
    }
}

impl Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConnectionDescriptor")
            .field("fields", &self.fields)
            .field("dsn_defaults", &self.dsn_defaults)
            .finish()
    }
}

/// Merges parameter layers into a [`ConnectionDescriptor`].
pub struct ParameterResolver<'a> {
    catalog: &'a dyn OdbcCatalog,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(catalog: &'a dyn OdbcCatalog) -> Self {
        Self { catalog }
    }

    /// Merge explicit fields over the configuration mapping and the DSN defaults.
    ///
    /// Without a DSN, `servername`, `database`, `username`, `password` and
    /// `dbtype` are required. With a DSN only the credentials are.
    pub fn resolve(
        &self,
        explicit: &ConnectionFields,
        config: &ConnectionFields,
    ) -> Result<ConnectionDescriptor> {
        let fields = config.clone().overlay(explicit);

        if let Some(port) = fields.port.as_deref()
            && port.trim().parse::<u16>().is_err()
        {
            return Err(Error::InvalidParameter(format!(
                "port must be a number between 0 and 65535, got '{}'",
                port
            )));
        }

        let dsn_defaults = match fields.dsn.as_deref() {
            Some(name) => {
                let entry = self.catalog.dsn(name);
                if entry.is_none() {
                    log::debug!("DSN {} is not registered in the readable ODBC config", name);
                }
                entry
            }
            None => None,
        };

        let descriptor = ConnectionDescriptor {
            fields,
            dsn_defaults,
        };

        let mut required: Vec<(&str, bool)> = Vec::new();
        if descriptor.dsn().is_none() {
            required.push(("servername", descriptor.servername().is_some()));
            required.push(("database", descriptor.database().is_some()));
        }
        required.push(("username", descriptor.fields.username.is_some()));
        required.push(("password", descriptor.fields.password.is_some()));
        if descriptor.dsn().is_none() {
            required.push(("dbtype", descriptor.dbtype().is_some()));
        }

        let missing: Vec<String> = required
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingParameter { missing });
        }

        log::debug!("resolved connection parameters: {:?}", descriptor);
        Ok(descriptor)
    }
}
