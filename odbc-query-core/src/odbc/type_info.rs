//! ODBC column type classification.

use odbc_api::DataType;

/// How a column's cells are read from the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Bool,
    Integer,
    Float,
    Binary,
    /// Everything else, including exact decimals and date/time values, read as text
    Text,
}

impl CellKind {
    pub fn of(data_type: DataType) -> Self {
        if data_type.accepts_binary_data() {
            CellKind::Binary
        } else if matches!(data_type, DataType::Bit) {
            CellKind::Bool
        } else if data_type.is_integer() {
            CellKind::Integer
        } else if data_type.is_approximate() {
            CellKind::Float
        } else {
            CellKind::Text
        }
    }
}

/// Get the display name for a DataType
pub fn data_type_name(dt: DataType) -> &'static str {
    match dt {
        DataType::BigInt => "BIGINT",
        DataType::Binary { .. } => "BINARY",
        DataType::Bit => "BIT",
        DataType::Char { .. } => "CHAR",
        DataType::Date => "DATE",
        DataType::Decimal { .. } => "DECIMAL",
        DataType::Double => "DOUBLE",
        DataType::Float { .. } => "FLOAT",
        DataType::Integer => "INTEGER",
        DataType::LongVarbinary { .. } => "LONGVARBINARY",
        DataType::LongVarchar { .. } => "LONGVARCHAR",
        DataType::Numeric { .. } => "NUMERIC",
        DataType::Real => "REAL",
        DataType::SmallInt => "SMALLINT",
        DataType::Time { .. } => "TIME",
        DataType::Timestamp { .. } => "TIMESTAMP",
        DataType::TinyInt => "TINYINT",
        DataType::Varbinary { .. } => "VARBINARY",
        DataType::Varchar { .. } => "VARCHAR",
        DataType::WChar { .. } => "WCHAR",
        DataType::WLongVarchar { .. } => "WLONGVARCHAR",
        DataType::WVarchar { .. } => "WVARCHAR",
        DataType::Unknown => "UNKNOWN",
        _ => "OTHER",
    }
}

/// Extension trait for DataType with helper methods
pub trait DataTypeExt {
    /// Check if this is a binary type
    fn accepts_binary_data(self) -> bool;

    /// Exact whole-number types
    fn is_integer(self) -> bool;

    /// Floating point types
    fn is_approximate(self) -> bool;
}

impl DataTypeExt for DataType {
    fn accepts_binary_data(self) -> bool {
        matches!(
            self,
            DataType::Binary { .. } | DataType::Varbinary { .. } | DataType::LongVarbinary { .. }
        )
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt
        )
    }

    fn is_approximate(self) -> bool {
        matches!(
            self,
            DataType::Real | DataType::Float { .. } | DataType::Double
        )
    }
}
