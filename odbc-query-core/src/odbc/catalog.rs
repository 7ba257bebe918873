//! Read-only view of the system ODBC configuration.
//!
//! The driver manager keeps its registered drivers in `odbcinst.ini` and its
//! data sources in `odbc.ini`. Nothing in this crate writes to those files;
//! the pipeline only asks an [`OdbcCatalog`] which driver to use for a
//! [`DbType`] and what defaults a named DSN carries.

use crate::odbc::{DbType, Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

const DRIVER_FILES: &[&str] = &[
    "/etc/odbcinst.ini",
    "/usr/local/etc/odbcinst.ini",
    "~/.odbcinst.ini",
];

const DSN_FILES: &[&str] = &["/etc/odbc.ini", "/usr/local/etc/odbc.ini", "~/.odbc.ini"];

/// Sections of `odbc.ini` that are driver manager settings rather than DSNs.
const RESERVED_DSN_SECTIONS: &[&str] = &["odbc data sources", "odbc"];

/// Lookup capability over the registered drivers and data sources.
pub trait OdbcCatalog: Send + Sync {
    /// The preferred registered driver for a database type, braced (`{FreeTDS}`).
    fn driver_for(&self, db_type: DbType) -> Option<String>;

    /// Defaults registered for a data source name.
    fn dsn(&self, name: &str) -> Option<DsnEntry>;
}

/// Connection defaults registered for one DSN.
///
/// Credentials are deliberately not part of this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DsnEntry {
    pub name: String,
    pub driver: Option<String>,
    pub server: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
}

impl DsnEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    fn from_section(section: &IniSection) -> Self {
        let mut entry = DsnEntry::new(section.name.clone());
        for (key, value) in &section.entries {
            let value = Some(value.clone()).filter(|v| !v.is_empty());
            match key.to_ascii_lowercase().as_str() {
                "driver" => entry.driver = value,
                "server" | "host" => entry.server = value,
                "port" => entry.port = value,
                "database" | "db" => entry.database = value,
                _ => {}
            }
        }
        entry
    }
}

/// An in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    drivers: BTreeMap<DbType, String>,
    dsns: HashMap<String, DsnEntry>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_driver(mut self, db_type: DbType, driver: impl Into<String>) -> Self {
        self.drivers.insert(db_type, driver.into());
        self
    }

    pub fn with_dsn(mut self, entry: DsnEntry) -> Self {
        self.dsns.insert(entry.name.to_ascii_lowercase(), entry);
        self
    }
}

impl OdbcCatalog for StaticCatalog {
    fn driver_for(&self, db_type: DbType) -> Option<String> {
        self.drivers.get(&db_type).cloned()
    }

    fn dsn(&self, name: &str) -> Option<DsnEntry> {
        self.dsns.get(&name.to_ascii_lowercase()).cloned()
    }
}

/// Catalog backed by the `odbcinst.ini` / `odbc.ini` files on this host.
#[derive(Debug, Clone, Default)]
pub struct SystemCatalog {
    driver_sections: Vec<String>,
    inner: StaticCatalog,
}

impl SystemCatalog {
    /// Load the standard locations, honouring `ODBCSYSINI`, `ODBCINSTINI` and `ODBCINI`.
    pub fn load() -> Result<Self> {
        let mut driver_files: Vec<PathBuf> = DRIVER_FILES.iter().filter_map(|p| expand_home(p)).collect();
        if let Some(dir) = std::env::var_os("ODBCSYSINI") {
            driver_files.push(Path::new(&dir).join("odbcinst.ini"));
        }
        if let Some(file) = std::env::var_os("ODBCINSTINI") {
            driver_files.push(PathBuf::from(file));
        }

        let mut dsn_files: Vec<PathBuf> = DSN_FILES.iter().filter_map(|p| expand_home(p)).collect();
        if let Some(file) = std::env::var_os("ODBCINI") {
            dsn_files.push(PathBuf::from(file));
        }

        Self::from_files(&driver_files, &dsn_files)
    }

    /// Load from explicit file lists. Missing files are skipped.
    pub fn from_files<P: AsRef<Path>>(driver_files: &[P], dsn_files: &[P]) -> Result<Self> {
        let driver_docs = read_ini_files(driver_files)?;
        let dsn_docs = read_ini_files(dsn_files)?;

        if driver_docs.is_empty() && dsn_docs.is_empty() {
            log::warn!("No ODBC configuration could be read");
        }

        let driver_sections: Vec<String> = driver_docs
            .iter()
            .flatten()
            .map(|section| section.name.clone())
            .collect();

        let mut inner = StaticCatalog::new();
        for db_type in DbType::ALL {
            if let Some(driver) = preferred_driver(&driver_sections, db_type) {
                log::debug!("using driver {} for {}", driver, db_type);
                inner = inner.with_driver(db_type, driver);
            }
        }

        for section in dsn_docs.iter().flatten() {
            if RESERVED_DSN_SECTIONS.contains(&section.name.to_ascii_lowercase().as_str()) {
                continue;
            }
            inner = inner.with_dsn(DsnEntry::from_section(section));
        }

        Ok(Self {
            driver_sections,
            inner,
        })
    }

    /// Names of every driver section that was read, in file order.
    pub fn driver_sections(&self) -> &[String] {
        &self.driver_sections
    }
}

impl OdbcCatalog for SystemCatalog {
    fn driver_for(&self, db_type: DbType) -> Option<String> {
        self.inner.driver_for(db_type)
    }

    fn dsn(&self, name: &str) -> Option<DsnEntry> {
        self.inner.dsn(name)
    }
}

/// Pick the driver for `db_type` among registered section names.
///
/// Patterns are tried in preference order; within a pattern the highest
/// version wins. The result is wrapped in braces.
pub fn preferred_driver<S: AsRef<str>>(sections: &[S], db_type: DbType) -> Option<String> {
    db_type
        .driver_patterns()
        .iter()
        .find_map(|pattern| best_driver(sections, pattern))
}

/// Find the newest driver whose name contains `pattern` (case-insensitive).
pub fn best_driver<S: AsRef<str>>(sections: &[S], pattern: &str) -> Option<String> {
    let pattern = pattern.to_ascii_lowercase();
    sections
        .iter()
        .map(|s| AsRef::<str>::as_ref(s))
        .filter(|name| name.to_ascii_lowercase().contains(&pattern))
        .map(|name| (driver_version(name), name))
        .max()
        .map(|(_, name)| format!("{{{}}}", name))
}

/// Version number embedded in a driver name.
///
/// Every character other than digits and dots is dropped, trailing `.0`
/// groups are ignored and a name without digits is version `[0]`.
pub fn driver_version(name: &str) -> Vec<u64> {
    let digits: String = name
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts: Vec<u64> = digits
        .split('.')
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();
    while parts.len() > 1 && parts.last() == Some(&0) {
        parts.pop();
    }
    if parts.is_empty() {
        parts.push(0);
    }
    parts
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IniSection {
    pub(crate) name: String,
    pub(crate) entries: Vec<(String, String)>,
}

fn read_ini_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Vec<IniSection>>> {
    let mut docs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => docs.push(parse_ini(&text, path)?),
            Err(e) => log::trace!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(docs)
}

/// Parse the subset of INI understood by unixODBC.
pub(crate) fn parse_ini(text: &str, path: &Path) -> Result<Vec<IniSection>> {
    let error = |line_no: usize, message: &str| Error::Catalog {
        path: path.display().to_string(),
        message: format!("line {}: {}", line_no, message),
    };

    let mut sections: Vec<IniSection> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| error(idx + 1, "unterminated section header"))?;
            sections.push(IniSection {
                name: name.trim().to_string(),
                entries: Vec::new(),
            });
            continue;
        }

        let section = sections
            .last_mut()
            .ok_or_else(|| error(idx + 1, "file contains no section headers"))?;
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| error(idx + 1, "expected KEY = VALUE"))?;
        section
            .entries
            .push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(sections)
}

/// Resolve a leading `~/` against the user's home directory.
///
/// `None` when the path is home-relative and there is no home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir();
            if home.is_none() {
                log::debug!("no home directory, skipping {}", path);
            }
            home.map(|home| home.join(rest))
        }
        None => Some(PathBuf::from(path)),
    }
}
