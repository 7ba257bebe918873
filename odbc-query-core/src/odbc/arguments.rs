//! Query text with its positional arguments.

use crate::odbc::placeholder::{QuoteEscape, count_placeholders};
use crate::odbc::{Error, OdbcValue, Result};
use odbc_api::parameter::{InputParameter, VarBinaryBox, VarCharBox};
use odbc_api::{Bit, IntoParameter};

/// A statement and the values substituted for its `?` placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub(crate) sql: String,
    pub(crate) values: Vec<OdbcValue>,
    pub(crate) quote_escape: QuoteEscape,
}

impl QuerySpec {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            values: Vec::new(),
            quote_escape: QuoteEscape::default(),
        }
    }

    /// Append one positional value
    pub fn bind(mut self, value: impl Into<OdbcValue>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn with_values(mut self, values: Vec<OdbcValue>) -> Self {
        self.values = values;
        self
    }

    /// String literal escaping used when counting placeholders.
    pub fn with_quote_escape(mut self, escape: QuoteEscape) -> Self {
        self.quote_escape = escape;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[OdbcValue] {
        &self.values
    }

    pub fn quote_escape(&self) -> QuoteEscape {
        self.quote_escape
    }

    /// Number of placeholders in the statement text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql, self.quote_escape)
    }

    /// Fail with [`Error::ParameterCount`] unless every placeholder has exactly one value.
    pub fn check_parameter_count(&self) -> Result<()> {
        let expected = self.placeholder_count();
        if expected == self.values.len() {
            Ok(())
        } else {
            Err(Error::ParameterCount {
                expected,
                given: self.values.len(),
            })
        }
    }

    /// Convert the values into ODBC input parameters.
    pub(crate) fn to_parameters(&self) -> Vec<Box<dyn InputParameter>> {
        self.values.iter().map(to_parameter).collect()
    }
}

fn to_parameter(value: &OdbcValue) -> Box<dyn InputParameter> {
    match value {
        OdbcValue::Null => Box::new(VarCharBox::null()),
        OdbcValue::Bool(b) => Box::new(Bit::from_bool(*b)),
        OdbcValue::Int(i) => Box::new(*i),
        OdbcValue::Float(f) => Box::new(*f),
        OdbcValue::Text(s) => Box::new(s.clone().into_parameter()),
        OdbcValue::Binary(bytes) => Box::new(VarBinaryBox::from_vec(bytes.clone())),
    }
}
