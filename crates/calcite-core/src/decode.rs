//! Result-set type decoding.
//!
//! Every column carries a JDBC type code. The code selects a [`TypeClass`]
//! through a static lookup table, and the class converts the raw bridge cell
//! into a native [`Value`]. The class depends only on the code. The shape of
//! the raw cell only decides how the conversion reads it.
//!
//! Some conversions lose information:
//! exact numerics come back as `f64`, timestamps lose sub-second digits and
//! their zone, and the `NULL` type code yields the text `"NULL"`.

use crate::error::{CoreError, CoreResult};
use crate::types::{sql_type, ColumnDescriptor, DecodedRow, RawCell, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIME_PARSE_FORMAT: &str = "%H:%M:%S%.f";

/// Conversion applied to every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// TINYINT, SMALLINT, INTEGER: values must fit in 32 bits.
    Integer,
    BigInt,
    /// Approximate and exact numerics, all read as `f64`.
    Numeric,
    Boolean,
    Character,
    Timestamp,
    Time,
    Date,
    Binary,
    /// The `NULL` type code.
    NullMarker,
    /// Anything the table does not list.
    Fallback,
}

/// Code → class dispatch table.
pub const TYPE_CLASSES: &[(i32, TypeClass)] = &[
    (sql_type::TINYINT, TypeClass::Integer),
    (sql_type::SMALLINT, TypeClass::Integer),
    (sql_type::INTEGER, TypeClass::Integer),
    (sql_type::BIGINT, TypeClass::BigInt),
    (sql_type::FLOAT, TypeClass::Numeric),
    (sql_type::DOUBLE, TypeClass::Numeric),
    (sql_type::DECIMAL, TypeClass::Numeric),
    (sql_type::REAL, TypeClass::Numeric),
    (sql_type::NUMERIC, TypeClass::Numeric),
    (sql_type::BIT, TypeClass::Boolean),
    (sql_type::BOOLEAN, TypeClass::Boolean),
    (sql_type::CHAR, TypeClass::Character),
    (sql_type::VARCHAR, TypeClass::Character),
    (sql_type::TIMESTAMP, TypeClass::Timestamp),
    (sql_type::TIMESTAMP_WITH_TIMEZONE, TypeClass::Timestamp),
    (sql_type::TIME, TypeClass::Time),
    (sql_type::TIME_WITH_TIMEZONE, TypeClass::Time),
    (sql_type::DATE, TypeClass::Date),
    (sql_type::BINARY, TypeClass::Binary),
    (sql_type::VARBINARY, TypeClass::Binary),
    (sql_type::NULL, TypeClass::NullMarker),
];

impl TypeClass {
    pub fn for_code(code: i32) -> Self {
        TYPE_CLASSES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, class)| *class)
            .unwrap_or(TypeClass::Fallback)
    }

    /// All type codes dispatched to this class.
    pub fn codes(self) -> impl Iterator<Item = i32> {
        TYPE_CLASSES
            .iter()
            .filter(move |(_, class)| *class == self)
            .map(|(code, _)| *code)
    }

    /// Convert a non-null cell. The error string is wrapped by the caller.
    fn convert(self, raw: &RawCell) -> Result<Value, String> {
        match self {
            TypeClass::Integer => {
                let v = read_i64(raw)?;
                let narrow = i32::try_from(v).map_err(|_| format!("{v} is out of 32-bit range"))?;
                Ok(Value::Int(i64::from(narrow)))
            }
            TypeClass::BigInt => read_i64(raw).map(Value::Int),
            TypeClass::Numeric => read_f64(raw).map(Value::Float),
            TypeClass::Boolean => read_bool(raw).map(Value::Bool),
            TypeClass::Character => Ok(Value::Text(match raw {
                RawCell::Text(s) => s.clone(),
                other => other.to_string(),
            })),
            TypeClass::Timestamp => read_timestamp(raw)
                .map(|ts| Value::Text(ts.format(TIMESTAMP_FORMAT).to_string())),
            TypeClass::Time => read_time(raw).map(Value::Text),
            TypeClass::Date => {
                read_date(raw).map(|d| Value::Text(d.format(DATE_FORMAT).to_string()))
            }
            TypeClass::Binary => match raw {
                RawCell::Bytes(b) => Ok(Value::Bytes(b.clone())),
                RawCell::Text(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
                other => Err(format!("cannot read {} as bytes", other.kind())),
            },
            TypeClass::NullMarker => Ok(Value::Text("NULL".to_string())),
            TypeClass::Fallback => Ok(Value::Text(raw.to_string())),
        }
    }
}

/// Decode one cell under its column's type code.
pub fn decode(code: i32, type_name: &str, raw: &RawCell) -> CoreResult<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    TypeClass::for_code(code)
        .convert(raw)
        .map_err(|message| CoreError::decode(code, type_name, message))
}

/// Decode a full row. Any failing cell aborts the row.
pub fn decode_row(descriptors: &[ColumnDescriptor], cells: &[RawCell]) -> CoreResult<DecodedRow> {
    if descriptors.len() != cells.len() {
        return Err(CoreError::decode(
            sql_type::NULL,
            "ROW",
            format!(
                "row has {} cells but the result set has {} columns",
                cells.len(),
                descriptors.len()
            ),
        ));
    }

    descriptors
        .iter()
        .zip(cells)
        .map(|(column, raw)| {
            decode(column.type_code, &column.type_name, raw).map_err(|e| match e {
                CoreError::Decode {
                    code,
                    type_name,
                    message,
                } => CoreError::Decode {
                    code,
                    type_name,
                    message: format!("column {}: {}", column.name, message),
                },
                other => other,
            })
        })
        .collect()
}

pub fn decode_column_names(descriptors: &[ColumnDescriptor]) -> Vec<String> {
    descriptors.iter().map(|c| c.name.clone()).collect()
}

pub fn decode_column_type_names(descriptors: &[ColumnDescriptor]) -> Vec<String> {
    descriptors.iter().map(|c| c.type_name.clone()).collect()
}

fn read_i64(raw: &RawCell) -> Result<i64, String> {
    match raw {
        RawCell::Int(v) => Ok(*v),
        RawCell::Bool(b) => Ok(i64::from(*b)),
        RawCell::Float(v) => {
            // 2^63 is the first f64 past i64::MAX; `as` would saturate it.
            if v.is_finite() && *v >= -9.223372036854775808e18 && *v < 9.223372036854775808e18 {
                Ok(v.trunc() as i64)
            } else {
                Err(format!("{v} is out of integer range"))
            }
        }
        RawCell::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid integer {s:?}: {e}")),
        other => Err(format!("cannot read {} as an integer", other.kind())),
    }
}

fn read_f64(raw: &RawCell) -> Result<f64, String> {
    match raw {
        RawCell::Float(v) => Ok(*v),
        RawCell::Int(v) => Ok(*v as f64),
        RawCell::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        RawCell::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number {s:?}: {e}")),
        other => Err(format!("cannot read {} as a number", other.kind())),
    }
}

fn read_bool(raw: &RawCell) -> Result<bool, String> {
    match raw {
        RawCell::Bool(b) => Ok(*b),
        RawCell::Int(v) => Ok(*v != 0),
        RawCell::Float(v) => Ok(*v != 0.0),
        RawCell::Text(s) => {
            let t = s.trim();
            if t.eq_ignore_ascii_case("true") || t == "1" {
                Ok(true)
            } else if t.eq_ignore_ascii_case("false") || t == "0" {
                Ok(false)
            } else {
                Err(format!("invalid boolean {s:?}"))
            }
        }
        other => Err(format!("cannot read {} as a boolean", other.kind())),
    }
}

fn read_timestamp(raw: &RawCell) -> Result<NaiveDateTime, String> {
    match raw {
        RawCell::Timestamp(ts) => Ok(*ts),
        RawCell::TimestampTz(ts) => Ok(ts.naive_local()),
        RawCell::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("invalid date {d}")),
        RawCell::Text(s) => {
            let head = prefix(s, 19);
            NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT)
                .map_err(|e| format!("invalid timestamp {s:?}: {e}"))
        }
        other => Err(format!("cannot read {} as a timestamp", other.kind())),
    }
}

fn read_date(raw: &RawCell) -> Result<NaiveDate, String> {
    match raw {
        RawCell::Date(d) => Ok(*d),
        RawCell::Timestamp(ts) => Ok(ts.date()),
        RawCell::TimestampTz(ts) => Ok(ts.naive_local().date()),
        RawCell::Text(s) => {
            let head = prefix(s, 10);
            NaiveDate::parse_from_str(head, DATE_FORMAT)
                .map_err(|e| format!("invalid date {s:?}: {e}"))
        }
        other => Err(format!("cannot read {} as a date", other.kind())),
    }
}

fn read_time(raw: &RawCell) -> Result<String, String> {
    match raw {
        RawCell::Time(t) => Ok(t.format(TIME_FORMAT).to_string()),
        RawCell::Timestamp(ts) => Ok(ts.time().format(TIME_FORMAT).to_string()),
        RawCell::TimestampTz(ts) => Ok(ts.naive_local().time().format(TIME_FORMAT).to_string()),
        RawCell::Text(s) if s.is_empty() => Ok(String::new()),
        RawCell::Text(s) => {
            // Drop a trailing zone offset (`+08:00`, `Z`) before parsing.
            let t = s.trim();
            let end = t
                .find(|c: char| !(c.is_ascii_digit() || c == ':' || c == '.'))
                .unwrap_or(t.len());
            NaiveTime::parse_from_str(&t[..end], TIME_PARSE_FORMAT)
                .map(|time| time.format(TIME_FORMAT).to_string())
                .map_err(|e| format!("invalid time {s:?}: {e}"))
        }
        other => Err(format!("cannot read {} as a time", other.kind())),
    }
}

/// First `n` bytes of `s`, or all of it when shorter or not on a char boundary.
fn prefix(s: &str, n: usize) -> &str {
    s.get(..n).unwrap_or(s)
}
