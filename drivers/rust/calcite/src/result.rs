use calcite_core::ReflectedColumn;
use serde::{Deserialize, Serialize};

/// Table metadata as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Schema the table lives in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Table name.
    pub name: String,

    /// Engine table type (`TABLE`, `VIEW`, ...).
    pub table_type: String,
}

/// Column metadata as listed by the engine for an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Engine type name, e.g. `decimal(10,2)`.
    pub type_name: String,

    /// JDBC nullability: 0 no nulls, 1 nullable, 2 unknown.
    pub nullable: i32,
}

impl ColumnInfo {
    /// Describe this column with a portable type. Unknown engine types
    /// come back as `NullType` rather than failing.
    pub fn reflect(&self) -> ReflectedColumn {
        ReflectedColumn::new(self.name.clone(), &self.type_name, self.nullable != 0)
    }
}

/// One entry of a cursor description: column name and engine type name.
pub type Description = Vec<(String, String)>;

#[cfg(test)]
mod tests {
    use super::*;
    use calcite_core::TypeClassification;

    #[test]
    fn test_column_info_reflect() {
        let info = ColumnInfo {
            name: "amount".into(),
            type_name: "DECIMAL(10,2)".into(),
            nullable: 0,
        };
        let col = info.reflect();
        assert_eq!(col.column_type, TypeClassification::Decimal);
        assert!(!col.nullable);

        let unknown = ColumnInfo {
            name: "shape".into(),
            type_name: "geometry".into(),
            nullable: 2,
        };
        let col = unknown.reflect();
        assert_eq!(col.column_type, TypeClassification::Null);
        assert!(col.nullable);
    }
}
