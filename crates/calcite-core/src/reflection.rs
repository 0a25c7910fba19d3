//! Engine-reported column type names → portable type classifications, used
//! when describing existing tables.
//!
//! Lookups never fail: a name the table does not know maps to
//! [`TypeClassification::Null`] so one odd column cannot abort introspection.

use crate::error::{CoreError, CoreResult};
use crate::types::sql_type;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeClassification {
    Boolean,
    TinyInteger,
    SmallInteger,
    Integer,
    BigInteger,
    Float,
    String,
    /// Carried as text by the engine; see [`process_date`].
    Date,
    /// Carried as text by the engine; see [`process_timestamp`].
    Timestamp,
    /// Carried as text by the engine; see [`process_decimal`].
    Decimal,
    /// Unknown engine type.
    Null,
}

impl TypeClassification {
    pub fn name(self) -> &'static str {
        match self {
            TypeClassification::Boolean => "Boolean",
            TypeClassification::TinyInteger => "TinyInteger",
            TypeClassification::SmallInteger => "SmallInteger",
            TypeClassification::Integer => "Integer",
            TypeClassification::BigInteger => "BigInteger",
            TypeClassification::Float => "Float",
            TypeClassification::String => "String",
            TypeClassification::Date => "Date",
            TypeClassification::Timestamp => "Timestamp",
            TypeClassification::Decimal => "Decimal",
            TypeClassification::Null => "NullType",
        }
    }

    /// Whether values of this class arrive as strings and need a processor.
    pub fn is_string_backed(self) -> bool {
        matches!(
            self,
            TypeClassification::Date | TypeClassification::Timestamp | TypeClassification::Decimal
        )
    }
}

pub const REFLECTION_MAP: &[(&str, TypeClassification)] = &[
    ("boolean", TypeClassification::Boolean),
    ("tinyint", TypeClassification::TinyInteger),
    ("smallint", TypeClassification::SmallInteger),
    ("int", TypeClassification::Integer),
    ("bigint", TypeClassification::BigInteger),
    ("float", TypeClassification::Float),
    ("double", TypeClassification::Float),
    ("string", TypeClassification::String),
    ("varchar", TypeClassification::String),
    ("binary", TypeClassification::String),
    ("array", TypeClassification::String),
    ("map", TypeClassification::String),
    ("struct", TypeClassification::String),
    ("uniontype", TypeClassification::String),
    ("date", TypeClassification::Date),
    ("timestamp", TypeClassification::Timestamp),
    ("decimal", TypeClassification::Decimal),
];

/// Leading word of a type name: `decimal(10,2)` → `decimal`,
/// `map<int,int>` → `map`.
fn base_type_name(engine_type: &str) -> String {
    static BASE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = BASE_REGEX.get_or_init(|| Regex::new(r"^\w+").expect("base type pattern is valid"));
    let normalized = engine_type.trim().to_lowercase();
    re.find(&normalized)
        .map(|m| m.as_str().to_string())
        .unwrap_or(normalized)
}

/// Classify an engine type name. Case-insensitive.
pub fn reflect_type(engine_type: &str) -> TypeClassification {
    let base = base_type_name(engine_type);
    match REFLECTION_MAP.iter().find(|(name, _)| *name == base) {
        Some((_, class)) => *class,
        None => {
            warn!(engine_type, "did not recognize column type");
            TypeClassification::Null
        }
    }
}

/// A column of an existing table, as described to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: TypeClassification,
    pub nullable: bool,
    pub default: Option<String>,
}

impl ReflectedColumn {
    pub fn new(name: impl Into<String>, engine_type: &str, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type: reflect_type(engine_type),
            nullable,
            default: None,
        }
    }
}

/// Parse a string-backed DATE value. A datetime string keeps its date.
pub fn process_date(value: &str) -> CoreResult<NaiveDate> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(d);
    }
    parse_datetime(value)
        .map(|dt| dt.date())
        .ok_or_else(|| CoreError::decode(sql_type::DATE, "date", format!("invalid date {value:?}")))
}

/// Parse a string-backed TIMESTAMP value, keeping sub-second digits.
pub fn process_timestamp(value: &str) -> CoreResult<NaiveDateTime> {
    let value = value.trim();
    if let Some(dt) = parse_datetime(value) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            CoreError::decode(
                sql_type::TIMESTAMP,
                "timestamp",
                format!("invalid timestamp {value:?}"),
            )
        })
}

/// Parse a string-backed DECIMAL value without going through floating point.
pub fn process_decimal(value: &str) -> CoreResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| {
        CoreError::decode(
            sql_type::DECIMAL,
            "decimal",
            format!("invalid decimal {value:?}: {e}"),
        )
    })
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn known_types() {
        assert_eq!(reflect_type("int"), TypeClassification::Integer);
        assert_eq!(reflect_type("bigint"), TypeClassification::BigInteger);
        assert_eq!(reflect_type("double"), TypeClassification::Float);
        assert_eq!(reflect_type("uniontype"), TypeClassification::String);
        assert_eq!(reflect_type("timestamp"), TypeClassification::Timestamp);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(reflect_type("DECIMAL"), reflect_type("decimal"));
        assert_eq!(reflect_type("Boolean"), TypeClassification::Boolean);
    }

    #[test]
    fn parameterised_names_use_their_base() {
        assert_eq!(reflect_type("decimal(10,1)"), TypeClassification::Decimal);
        assert_eq!(reflect_type("map<int,int>"), TypeClassification::String);
        assert_eq!(reflect_type(" VARCHAR(20) "), TypeClassification::String);
    }

    #[test]
    fn unknown_types_degrade() {
        assert_eq!(reflect_type("geometry"), TypeClassification::Null);
        assert_eq!(reflect_type(""), TypeClassification::Null);
        assert_eq!(reflect_type("integer"), TypeClassification::Null);
    }

    #[test]
    fn string_backed_classes() {
        let backed: Vec<_> = REFLECTION_MAP
            .iter()
            .map(|(_, c)| *c)
            .filter(|c| c.is_string_backed())
            .collect();
        assert_eq!(
            backed,
            vec![
                TypeClassification::Date,
                TypeClassification::Timestamp,
                TypeClassification::Decimal
            ]
        );
    }

    #[test]
    fn processors() {
        assert_eq!(
            process_date("2020-07-28 12:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 28).unwrap()
        );
        let ts = process_timestamp("2021-05-01T10:20:30.250").unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
        assert_eq!(
            process_timestamp("2021-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2021, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(process_decimal("123.456").unwrap().to_string(), "123.456");
        assert!(process_decimal("12x").is_err());
        assert!(process_date("not a date").is_err());
    }

    #[test]
    fn reflected_column_serializes_type_key() {
        let col = ReflectedColumn::new("amount", "decimal(12,2)", true);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "Decimal");
        assert_eq!(json["default"], serde_json::Value::Null);
    }
}
