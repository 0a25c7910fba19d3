//! Portable DDL type names → engine DDL tokens.

/// Portable types the engine spells differently. Temporal types collapse to
/// a single TIMESTAMP token.
pub const TYPE_NAME_MAP: &[(&str, &str)] = &[
    ("INTEGER", "INT"),
    ("NUMERIC", "DECIMAL"),
    ("CHAR", "STRING"),
    ("VARCHAR", "STRING"),
    ("NCHAR", "STRING"),
    ("TEXT", "STRING"),
    ("CLOB", "STRING"),
    ("BLOB", "BINARY"),
    ("TIME", "TIMESTAMP"),
    ("DATE", "TIMESTAMP"),
    ("DATETIME", "TIMESTAMP"),
];

/// Engine token for a bare portable type name, if the engine renames it.
pub fn engine_type_token(portable: &str) -> Option<&'static str> {
    TYPE_NAME_MAP
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(portable))
        .map(|(_, token)| *token)
}

/// Compile a portable column type into the engine's DDL token.
///
/// Length and precision arguments of a renamed type are dropped
/// (`VARCHAR(255)` → `STRING`). Types the engine does not rename are returned
/// as given.
pub fn compile_type_name(portable: &str) -> String {
    let trimmed = portable.trim();
    let base = trimmed
        .split_once('(')
        .map_or(trimmed, |(head, _)| head)
        .trim_end();
    match engine_type_token(base) {
        Some(token) => token.to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renamed_types() {
        assert_eq!(compile_type_name("INTEGER"), "INT");
        assert_eq!(compile_type_name("NUMERIC"), "DECIMAL");
        assert_eq!(compile_type_name("BLOB"), "BINARY");
        for t in ["CHAR", "VARCHAR", "NCHAR", "TEXT", "CLOB"] {
            assert_eq!(compile_type_name(t), "STRING", "{t}");
        }
        for t in ["TIME", "DATE", "DATETIME"] {
            assert_eq!(compile_type_name(t), "TIMESTAMP", "{t}");
        }
    }

    #[test]
    fn arguments_and_case() {
        assert_eq!(compile_type_name("varchar(255)"), "STRING");
        assert_eq!(compile_type_name("NUMERIC (10, 2)"), "DECIMAL");
    }

    #[test]
    fn other_types_pass_through() {
        assert_eq!(compile_type_name("BIGINT"), "BIGINT");
        assert_eq!(compile_type_name("DECIMAL(10, 2)"), "DECIMAL(10, 2)");
        assert_eq!(compile_type_name("BOOLEAN"), "BOOLEAN");
        assert_eq!(engine_type_token("FLOAT"), None);
    }
}
