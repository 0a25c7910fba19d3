//! # calcite
//!
//! An async Rust driver for Apache Calcite based query engines.
//!
//! The engine is reached through a [`Connector`] that opens a [`Bridge`];
//! the driver turns the bridge's raw cells into [`Value`]s and rewrites
//! generic SQL into the engine's dialect.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use calcite::{Config, Connection, Connector};
//! use std::sync::Arc;
//!
//! async fn run(connector: Arc<dyn Connector>) -> Result<(), calcite::Error> {
//!     let config = Config::from_url("calcite://localhost/sales?lex=MYSQL")?;
//!     let conn = Connection::connect(connector, config).await?;
//!
//!     let mut cursor = conn.cursor();
//!     cursor.execute("SELECT * FROM {} LIMIT {}", &[&"users", &10]).await?;
//!     for row in cursor.fetch_all().await? {
//!         println!("{:?}", row);
//!     }
//!
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod config;
mod connection;
mod cursor;
mod error;
mod result;

pub use bridge::{Bridge, Connector, Execution, ResultSet};
pub use config::{Config, ConfigBuilder, Lex, DEFAULT_LIMIT, DEFAULT_PORT};
pub use connection::Connection;
pub use cursor::{format_statement, Cursor, Param};
pub use error::Error;
pub use result::{ColumnInfo, Description, TableInfo};

pub use calcite_core::{ColumnDescriptor, DecodedRow, RawCell, ReflectedColumn, Value};
