//! # calcite-core
//!
//! The engine-specific pieces of the Calcite driver:
//!
//! - [`decode`] turns a row of JDBC-typed bridge cells into native values.
//! - [`dialect`] rewrites generic compiler output into the engine's syntax.
//! - [`type_compiler`] maps portable DDL types to the engine's type tokens.
//! - [`reflection`] maps engine-reported type names back to portable classes.
//!
//! Everything here is synchronous and holds no state between calls.
//!
//! ```rust
//! use calcite_core::{decode_row, rewrite_statement, ColumnDescriptor, RawCell, Value};
//! use calcite_core::sql_type;
//!
//! let columns = vec![
//!     ColumnDescriptor::new("id", sql_type::BIGINT, "BIGINT"),
//!     ColumnDescriptor::new("price", sql_type::DECIMAL, "DECIMAL"),
//! ];
//! let row = decode_row(&columns, &[RawCell::Int(1), RawCell::from("9.5")]).unwrap();
//! assert_eq!(row, vec![Value::Int(1), Value::Float(9.5)]);
//!
//! let sql = rewrite_statement("INSERT INTO t (a) SELECT a FROM s").unwrap();
//! assert_eq!(sql, "INSERT INTO TABLE t SELECT a FROM s");
//! ```

pub mod decode;
pub mod dialect;
pub mod error;
pub mod reflection;
pub mod type_compiler;
pub mod types;

pub use decode::{decode, decode_column_names, decode_column_type_names, decode_row, TypeClass};
pub use dialect::{
    compile_char_length, compile_concat, flatten_column_reference, quote_identifier,
    quote_qualified, rewrite_insert, rewrite_statement, rewrite_with, RewriteRule,
};
pub use error::{CoreError, CoreResult};
pub use reflection::{
    process_date, process_decimal, process_timestamp, reflect_type, ReflectedColumn,
    TypeClassification,
};
pub use type_compiler::compile_type_name;
pub use types::{sql_type, ColumnDescriptor, DecodedRow, RawCell, Value};
