use crate::bridge::{Bridge, ResultSet};
use crate::connection::{active_bridge, SharedBridge};
use crate::error::Error;
use crate::result::Description;
use calcite_core::{
    decode_column_names, decode_column_type_names, decode_row, rewrite_statement,
    ColumnDescriptor, CoreError, DecodedRow,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A positional statement parameter, inserted with its `Display` form.
pub type Param<'a> = &'a (dyn fmt::Display + Sync);

/// Runs statements over a connection and fetches decoded rows.
pub struct Cursor {
    bridge: SharedBridge,
    /// The bridge the current result set was opened on.
    session: Option<Arc<dyn Bridge>>,
    result_set: Option<Box<dyn ResultSet>>,
    columns: Vec<ColumnDescriptor>,
    array_size: usize,
    row_count: i64,
    closed: bool,
}

impl Cursor {
    pub(crate) fn new(bridge: SharedBridge) -> Self {
        Self {
            bridge,
            session: None,
            result_set: None,
            columns: Vec::new(),
            array_size: 1,
            row_count: -1,
            closed: false,
        }
    }

    /// Execute `operation` after substituting `params` into its `{}` / `{n}`
    /// placeholders. With no params the operation is sent as is.
    pub async fn execute(
        &mut self,
        operation: &str,
        params: &[Param<'_>],
    ) -> Result<&mut Self, Error> {
        let sql = format_statement(operation, params)?;
        self.run(&sql).await?;
        Ok(self)
    }

    /// Execute a statement written in generic SQL, rewriting it for the
    /// engine first.
    pub async fn execute_generic(&mut self, sql: &str) -> Result<&mut Self, Error> {
        let rewritten = rewrite_statement(sql)?;
        self.run(&rewritten).await?;
        Ok(self)
    }

    /// Execute `operation` once per parameter set as a single batch. The
    /// row count becomes the sum of the per-statement update counts.
    pub async fn execute_many(
        &mut self,
        operation: &str,
        param_sets: &[&[Param<'_>]],
    ) -> Result<&mut Self, Error> {
        self.ensure_open()?;
        let statements = param_sets
            .iter()
            .map(|params| format_statement(operation, params))
            .collect::<Result<Vec<_>, _>>()?;

        self.reset().await?;
        let bridge = active_bridge(&self.bridge).await?;
        debug!(statements = statements.len(), "executing batch");
        let counts = bridge.execute_batch(&statements).await?;
        self.row_count = counts.iter().filter(|c| **c >= 0).sum();
        Ok(self)
    }

    async fn run(&mut self, sql: &str) -> Result<(), Error> {
        self.ensure_open()?;
        self.reset().await?;
        let bridge = active_bridge(&self.bridge).await?;

        debug!(sql, "executing statement");
        let execution = bridge.execute(sql).await?;
        match execution.result_set {
            Some(mut rs) => {
                self.columns = rs.columns().to_vec();
                rs.set_fetch_size(self.array_size);
                self.result_set = Some(rs);
                self.session = Some(bridge);
                self.row_count = -1;
            }
            None => {
                self.row_count = execution.update_count;
            }
        }
        Ok(())
    }

    /// Drop the previous statement's result set and metadata.
    async fn reset(&mut self) -> Result<(), Error> {
        self.columns.clear();
        self.row_count = -1;
        self.session = None;
        if let Some(mut rs) = self.result_set.take() {
            rs.close().await?;
        }
        Ok(())
    }

    /// Fail, and drop the result set, when the connection it came from has
    /// been closed or reopened since the statement ran.
    async fn ensure_session(&mut self) -> Result<(), Error> {
        let current = self.bridge.lock().await.clone();
        let live = match (&current, &self.session) {
            (Some(current), Some(session)) => Arc::ptr_eq(current, session),
            _ => false,
        };
        if live {
            return Ok(());
        }

        self.columns.clear();
        self.session = None;
        if let Some(mut rs) = self.result_set.take() {
            if let Err(e) = rs.close().await {
                debug!(error = %e, "closing result set of a closed connection");
            }
        }
        Err(Error::Database("Connection has been closed".into()))
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Programming("Cursor has been closed".into()));
        }
        Ok(())
    }

    /// The next decoded row, or `None` when there is no result set or it is
    /// exhausted. A cell that fails to decode aborts the whole row. Fetching
    /// after the connection was closed is a `Database` error.
    pub async fn fetch_one(&mut self) -> Result<Option<DecodedRow>, Error> {
        if self.result_set.is_none() {
            return Ok(None);
        }
        self.ensure_session().await?;
        let Some(rs) = self.result_set.as_mut() else {
            return Ok(None);
        };
        let cells = match rs.next_row().await? {
            Some(cells) => cells,
            None => return Ok(None),
        };
        Ok(Some(decode_row(&self.columns, &cells)?))
    }

    /// Up to `size` rows (`array_size` when `None` or zero). Fewer rows come
    /// back once the result set runs out.
    pub async fn fetch_many(&mut self, size: Option<usize>) -> Result<Vec<DecodedRow>, Error> {
        let size = match size {
            Some(n) if n > 0 => n,
            _ => self.array_size,
        };
        if let Some(rs) = self.result_set.as_mut() {
            rs.set_fetch_size(size);
        }
        let mut rows = Vec::with_capacity(size);
        while rows.len() < size {
            match self.fetch_one().await? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Every remaining row.
    pub async fn fetch_all(&mut self) -> Result<Vec<DecodedRow>, Error> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one().await? {
            rows.push(row);
        }
        debug!(rows = rows.len(), "fetched all rows");
        Ok(rows)
    }

    /// `(name, type name)` per column of the current result set.
    pub fn description(&self) -> Description {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.type_name.clone()))
            .collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        decode_column_names(&self.columns)
    }

    pub fn column_type_names(&self) -> Vec<String> {
        decode_column_type_names(&self.columns)
    }

    /// JDBC type codes of the current result set's columns.
    pub fn column_types(&self) -> Vec<i32> {
        self.columns.iter().map(|c| c.type_code).collect()
    }

    /// Rows affected by the last statement, or -1 for a query.
    pub fn row_count(&self) -> i64 {
        self.row_count
    }

    pub fn array_size(&self) -> usize {
        self.array_size
    }

    pub fn set_array_size(&mut self, size: usize) {
        self.array_size = size.max(1);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the current result set. The connection stays open.
    pub async fn close(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.reset().await?;
        self.closed = true;
        Ok(())
    }

    pub fn next_set(&mut self) -> Result<(), Error> {
        Err(CoreError::Unsupported("next_set".into()).into())
    }

    pub fn set_input_sizes(&mut self, _sizes: &[usize]) -> Result<(), Error> {
        Err(CoreError::Unsupported("set_input_sizes".into()).into())
    }

    pub fn set_output_size(&mut self, _size: usize, _column: Option<usize>) -> Result<(), Error> {
        Err(CoreError::Unsupported("set_output_size".into()).into())
    }
}

/// Substitute positional parameters into `operation`.
///
/// `{}` takes the next parameter, `{n}` the n-th, and `{{` / `}}` are literal
/// braces. Values are inserted with their `Display` form and are not quoted.
pub fn format_statement(operation: &str, params: &[Param<'_>]) -> Result<String, Error> {
    if params.is_empty() {
        return Ok(operation.to_string());
    }

    let mut out = String::with_capacity(operation.len());
    let mut next = 0usize;
    let mut chars = operation.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => digits.push(ch),
                        None => {
                            return Err(Error::Programming(format!(
                                "unclosed placeholder in: {operation}"
                            )))
                        }
                    }
                }
                let index = if digits.trim().is_empty() {
                    next += 1;
                    next - 1
                } else {
                    digits.trim().parse::<usize>().map_err(|_| {
                        Error::Programming(format!("invalid placeholder {{{digits}}}"))
                    })?
                };
                let param = params.get(index).ok_or_else(|| {
                    Error::Programming(format!(
                        "missing parameter {index}: {} supplied",
                        params.len()
                    ))
                })?;
                out.push_str(&param.to_string());
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(Error::Programming(format!(
                    "unmatched '}}' in: {operation}"
                )))
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_positional() {
        let sql = format_statement("SELECT * FROM {} WHERE id = {}", &[&"users", &42]).unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE id = 42");
    }

    #[test]
    fn test_format_indexed() {
        let sql = format_statement("SELECT {1}, {0}, {1}", &[&"a", &"b"]).unwrap();
        assert_eq!(sql, "SELECT b, a, b");
    }

    #[test]
    fn test_format_escaped_braces() {
        let sql = format_statement("SELECT '{{x}}', {}", &[&1]).unwrap();
        assert_eq!(sql, "SELECT '{x}', 1");
    }

    #[test]
    fn test_format_without_params_is_verbatim() {
        let sql = format_statement("SELECT '{not a placeholder'", &[]).unwrap();
        assert_eq!(sql, "SELECT '{not a placeholder'");
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(
            format_statement("SELECT {}, {}", &[&1]),
            Err(Error::Programming(_))
        ));
        assert!(matches!(
            format_statement("SELECT {5}", &[&1]),
            Err(Error::Programming(_))
        ));
        assert!(matches!(
            format_statement("SELECT {x}", &[&1]),
            Err(Error::Programming(_))
        ));
        assert!(matches!(
            format_statement("SELECT {", &[&1]),
            Err(Error::Programming(_))
        ));
        assert!(matches!(
            format_statement("SELECT }", &[&1]),
            Err(Error::Programming(_))
        ));
    }
}
