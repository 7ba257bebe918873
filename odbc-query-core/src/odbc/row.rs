//! Result normalization: rows as column-name to value mappings.

use crate::odbc::{Error, OdbcValue, Result, ResultSet};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::str::FromStr;

/// What to do when a result set repeats a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateColumns {
    /// Keep the first column's position and the last column's value
    #[default]
    LastWins,
    /// Fail with [`Error::DuplicateColumn`]
    Reject,
    /// Rename repeats to `name_2`, `name_3`, ...
    Suffix,
}

impl DuplicateColumns {
    pub const fn name(self) -> &'static str {
        match self {
            DuplicateColumns::LastWins => "last-wins",
            DuplicateColumns::Reject => "reject",
            DuplicateColumns::Suffix => "suffix",
        }
    }
}

impl FromStr for DuplicateColumns {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "last-wins" => Ok(DuplicateColumns::LastWins),
            "reject" => Ok(DuplicateColumns::Reject),
            "suffix" => Ok(DuplicateColumns::Suffix),
            other => Err(Error::InvalidParameter(format!(
                "unknown duplicate column policy '{}'",
                other
            ))),
        }
    }
}

/// One row as an ordered mapping from column name to value.
///
/// Keys are unique and appear in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    entries: Vec<(String, OdbcValue)>,
}

impl NormalizedRow {
    pub fn get(&self, column: &str) -> Option<&OdbcValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OdbcValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NormalizedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Where each column's value lands in a normalized row.
struct KeyPlan {
    keys: Vec<String>,
    slots: Vec<usize>,
}

impl KeyPlan {
    fn new(columns: &[String], policy: DuplicateColumns) -> Result<Self> {
        let mut keys: Vec<String> = Vec::with_capacity(columns.len());
        let mut slots = Vec::with_capacity(columns.len());

        match policy {
            DuplicateColumns::LastWins => {
                for column in columns {
                    match keys.iter().position(|k| k == column) {
                        Some(slot) => slots.push(slot),
                        None => {
                            slots.push(keys.len());
                            keys.push(column.clone());
                        }
                    }
                }
            }
            DuplicateColumns::Reject => {
                let mut seen = HashSet::new();
                for column in columns {
                    if !seen.insert(column.as_str()) {
                        return Err(Error::DuplicateColumn {
                            name: column.clone(),
                        });
                    }
                    slots.push(keys.len());
                    keys.push(column.clone());
                }
            }
            DuplicateColumns::Suffix => {
                let taken: HashSet<&str> = columns.iter().map(String::as_str).collect();
                let mut used: HashSet<String> = HashSet::new();
                for column in columns {
                    let mut key = column.clone();
                    let mut n = 2;
                    while used.contains(&key) {
                        key = format!("{}_{}", column, n);
                        n += 1;
                        // never steal a name a later column uses verbatim
                        while taken.contains(key.as_str()) {
                            key = format!("{}_{}", column, n);
                            n += 1;
                        }
                    }
                    used.insert(key.clone());
                    slots.push(keys.len());
                    keys.push(key);
                }
            }
        }

        Ok(Self { keys, slots })
    }

    fn apply(&self, values: Vec<OdbcValue>) -> NormalizedRow {
        let mut cells: Vec<OdbcValue> = vec![OdbcValue::Null; self.keys.len()];
        for (value, &slot) in values.into_iter().zip(&self.slots) {
            cells[slot] = value;
        }
        NormalizedRow {
            entries: self.keys.iter().cloned().zip(cells).collect(),
        }
    }
}

/// Zip column names with every row, preserving row and column order.
pub fn normalize(result_set: ResultSet, policy: DuplicateColumns) -> Result<Vec<NormalizedRow>> {
    let plan = KeyPlan::new(&result_set.columns, policy)?;
    Ok(result_set
        .rows
        .into_iter()
        .map(|row| plan.apply(row))
        .collect())
}
