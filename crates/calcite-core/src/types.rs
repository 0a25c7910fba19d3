//! Column metadata and the cell/value types exchanged with the engine bridge.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JDBC type codes, numbered as in `java.sql.Types`.
pub mod sql_type {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const BIGINT: i32 = -5;
    pub const VARBINARY: i32 = -3;
    pub const BINARY: i32 = -2;
    pub const NULL: i32 = 0;
    pub const CHAR: i32 = 1;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const INTEGER: i32 = 4;
    pub const SMALLINT: i32 = 5;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const VARCHAR: i32 = 12;
    pub const BOOLEAN: i32 = 16;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const OTHER: i32 = 1111;
    pub const JAVA_OBJECT: i32 = 2000;
    pub const ARRAY: i32 = 2003;
    pub const TIME_WITH_TIMEZONE: i32 = 2013;
    pub const TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
}

/// Metadata for one result-set column, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_code: i32,
    pub type_name: String,
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_code: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_code,
            type_name: type_name.into(),
            nullable: true,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// A single cell as handed back by the bridge, before decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
}

impl RawCell {
    pub fn is_null(&self) -> bool {
        matches!(self, RawCell::Null)
    }

    /// Short name of the representation, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawCell::Null => "null",
            RawCell::Int(_) => "int",
            RawCell::Float(_) => "float",
            RawCell::Bool(_) => "bool",
            RawCell::Text(_) => "text",
            RawCell::Bytes(_) => "bytes",
            RawCell::Date(_) => "date",
            RawCell::Time(_) => "time",
            RawCell::Timestamp(_) => "timestamp",
            RawCell::TimestampTz(_) => "timestamp with time zone",
        }
    }
}

/// The engine's own string rendering of a cell.
impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Null => write!(f, "null"),
            RawCell::Int(v) => write!(f, "{v}"),
            RawCell::Float(v) => write!(f, "{v}"),
            RawCell::Bool(v) => write!(f, "{v}"),
            RawCell::Text(s) => f.write_str(s),
            RawCell::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            RawCell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            RawCell::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            RawCell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            RawCell::TimestampTz(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f%:z")),
        }
    }
}

impl From<i64> for RawCell {
    fn from(v: i64) -> Self {
        RawCell::Int(v)
    }
}

impl From<f64> for RawCell {
    fn from(v: f64) -> Self {
        RawCell::Float(v)
    }
}

impl From<bool> for RawCell {
    fn from(v: bool) -> Self {
        RawCell::Bool(v)
    }
}

impl From<&str> for RawCell {
    fn from(v: &str) -> Self {
        RawCell::Text(v.to_string())
    }
}

impl From<String> for RawCell {
    fn from(v: String) -> Self {
        RawCell::Text(v)
    }
}

impl From<Vec<u8>> for RawCell {
    fn from(v: Vec<u8>) -> Self {
        RawCell::Bytes(v)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(v: Option<T>) -> Self {
        v.map_or(RawCell::Null, Into::into)
    }
}

/// A decoded, native value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// One decoded row, positionally aligned with its column descriptors.
pub type DecodedRow = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_cell_renders_like_the_engine() {
        let ts = NaiveDate::from_ymd_opt(2021, 5, 1)
            .unwrap()
            .and_hms_milli_opt(10, 20, 30, 999)
            .unwrap();
        assert_eq!(RawCell::Timestamp(ts).to_string(), "2021-05-01 10:20:30.999");
        assert_eq!(RawCell::Bool(true).to_string(), "true");
        assert_eq!(RawCell::Int(-3).to_string(), "-3");
    }

    #[test]
    fn option_converts_to_null() {
        let none: Option<i64> = None;
        assert!(RawCell::from(none).is_null());
        assert_eq!(RawCell::from(Some("x")), RawCell::Text("x".into()));
    }

    #[test]
    fn value_serializes_untagged() {
        let row = vec![Value::Int(1), Value::Null, Value::Text("a".into())];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[1,null,"a"]"#);
    }
}
