//! The seam between the driver and whatever actually talks to the engine.
//!
//! A bridge runs statements and hands back column metadata plus rows of
//! [`RawCell`]s. It owns every engine resource; the driver only borrows the
//! values it produces.

use crate::config::Lex;
use crate::error::Error;
use crate::result::{ColumnInfo, TableInfo};
use async_trait::async_trait;
use calcite_core::{ColumnDescriptor, RawCell};

/// Opens bridges. Called once per connect or reconnect attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, model: &str, lex: Lex) -> Result<Box<dyn Bridge>, Error>;
}

/// An open engine session.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Run one statement.
    async fn execute(&self, sql: &str) -> Result<Execution, Error>;

    /// Run statements as one batch, returning per-statement update counts.
    async fn execute_batch(&self, statements: &[String]) -> Result<Vec<i64>, Error>;

    async fn commit(&self) -> Result<(), Error>;

    async fn close(&self) -> Result<(), Error>;

    async fn schemas(&self) -> Result<Vec<String>, Error>;

    /// Tables in `schema` (all schemas when `None`) whose type is one of
    /// `table_types`.
    async fn tables(
        &self,
        schema: Option<&str>,
        table_types: &[&str],
    ) -> Result<Vec<TableInfo>, Error>;

    async fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>, Error>;
}

/// An open result set positioned before its first row.
#[async_trait]
pub trait ResultSet: Send {
    fn columns(&self) -> &[ColumnDescriptor];

    /// The next row, or `None` once the result set is exhausted.
    async fn next_row(&mut self) -> Result<Option<Vec<RawCell>>, Error>;

    /// Hint for how many rows the caller is about to read.
    fn set_fetch_size(&mut self, _rows: usize) {}

    async fn close(&mut self) -> Result<(), Error>;
}

/// Outcome of a single statement.
pub struct Execution {
    /// Rows affected, or -1 when the statement produced a result set.
    pub update_count: i64,
    pub result_set: Option<Box<dyn ResultSet>>,
}

impl Execution {
    pub fn rows(result_set: Box<dyn ResultSet>) -> Self {
        Self {
            update_count: -1,
            result_set: Some(result_set),
        }
    }

    pub fn update(count: i64) -> Self {
        Self {
            update_count: count,
            result_set: None,
        }
    }
}

impl std::fmt::Debug for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Execution")
            .field("update_count", &self.update_count)
            .field("has_result_set", &self.result_set.is_some())
            .finish()
    }
}
