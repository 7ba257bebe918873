//! Raw statement results.

use crate::odbc::OdbcValue;

/// Column names and rows exactly as the driver returned them.
///
/// Column names are not necessarily unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<OdbcValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Its length must match the number of columns.
    pub fn push_row(&mut self, row: Vec<OdbcValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: Vec<OdbcValue>) -> Self {
        self.push_row(row);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<OdbcValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What executing one statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A row-returning statement (SELECT and friends)
    Rows(ResultSet),
    /// A statement that only reports how many rows it touched
    Affected(u64),
}

impl QueryOutcome {
    /// Number of rows affected, `None` for row-returning statements.
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            QueryOutcome::Rows(_) => None,
            QueryOutcome::Affected(n) => Some(*n),
        }
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            QueryOutcome::Rows(set) => Some(set),
            QueryOutcome::Affected(_) => None,
        }
    }
}
