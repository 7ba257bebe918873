//! Owned values exchanged with the driver.

use crate::odbc::Error;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt::Write;

/// A single query parameter or result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum OdbcValue {
    /// Null value
    Null,
    /// Boolean/Bit value
    Bool(bool),
    /// Any integer column, widened to 64 bits
    Int(i64),
    /// Any approximate numeric column
    Float(f64),
    /// Text string, including decimals, dates and anything else the driver renders as text
    Text(String),
    /// Binary data
    Binary(Vec<u8>),
}

impl OdbcValue {
    pub fn is_null(&self) -> bool {
        matches!(self, OdbcValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OdbcValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OdbcValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render as the text the driver would receive for a character parameter.
    pub fn to_text(&self) -> Option<String> {
        match self {
            OdbcValue::Null => None,
            OdbcValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            OdbcValue::Int(i) => Some(i.to_string()),
            OdbcValue::Float(f) => Some(f.to_string()),
            OdbcValue::Text(s) => Some(s.clone()),
            OdbcValue::Binary(bytes) => Some(hex(bytes)),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        let _ = write!(out, "{:02X}", b);
    }
    out
}

impl Serialize for OdbcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OdbcValue::Null => serializer.serialize_none(),
            OdbcValue::Bool(b) => serializer.serialize_bool(*b),
            OdbcValue::Int(i) => serializer.serialize_i64(*i),
            OdbcValue::Float(f) => serializer.serialize_f64(*f),
            OdbcValue::Text(s) => serializer.serialize_str(s),
            OdbcValue::Binary(bytes) => serializer.serialize_str(&hex(bytes)),
        }
    }
}

impl TryFrom<JsonValue> for OdbcValue {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Null => Ok(OdbcValue::Null),
            JsonValue::Bool(b) => Ok(OdbcValue::Bool(b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(OdbcValue::Int(i)),
                None => n.as_f64().map(OdbcValue::Float).ok_or_else(|| {
                    Error::InvalidParameter(format!("number {} is out of range", n))
                }),
            },
            JsonValue::String(s) => Ok(OdbcValue::Text(s)),
            other => Err(Error::InvalidParameter(format!(
                "cannot bind {} as a query value",
                other
            ))),
        }
    }
}

// Conversion helpers
impl From<bool> for OdbcValue {
    fn from(v: bool) -> Self {
        OdbcValue::Bool(v)
    }
}

impl From<i32> for OdbcValue {
    fn from(v: i32) -> Self {
        OdbcValue::Int(v.into())
    }
}

impl From<i64> for OdbcValue {
    fn from(v: i64) -> Self {
        OdbcValue::Int(v)
    }
}

impl From<f64> for OdbcValue {
    fn from(v: f64) -> Self {
        OdbcValue::Float(v)
    }
}

impl From<String> for OdbcValue {
    fn from(v: String) -> Self {
        OdbcValue::Text(v)
    }
}

impl From<&str> for OdbcValue {
    fn from(v: &str) -> Self {
        OdbcValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for OdbcValue {
    fn from(v: Vec<u8>) -> Self {
        OdbcValue::Binary(v)
    }
}

impl<T: Into<OdbcValue>> From<Option<T>> for OdbcValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(OdbcValue::Null, Into::into)
    }
}
