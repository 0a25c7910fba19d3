use crate::bridge::{Bridge, Connector};
use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::result::TableInfo;
use calcite_core::ReflectedColumn;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

/// The bridge a connection and its cursors share. `None` once closed.
pub(crate) type SharedBridge = Arc<Mutex<Option<Arc<dyn Bridge>>>>;

/// The open bridge, or an error when the connection has been closed.
pub(crate) async fn active_bridge(shared: &SharedBridge) -> Result<Arc<dyn Bridge>, Error> {
    shared
        .lock()
        .await
        .clone()
        .ok_or_else(|| Error::Database("Connection has been closed".into()))
}

/// A connection to a Calcite engine through a bridge.
pub struct Connection {
    connector: Arc<dyn Connector>,
    config: Config,
    bridge: SharedBridge,
}

impl Connection {
    /// Open a connection, retrying per the config.
    pub async fn connect(connector: Arc<dyn Connector>, config: Config) -> Result<Self, Error> {
        let bridge = Self::connect_with_retry(connector.as_ref(), &config).await?;
        Ok(Self {
            connector,
            config,
            bridge: Arc::new(Mutex::new(Some(bridge))),
        })
    }

    async fn connect_with_retry(
        connector: &dyn Connector,
        config: &Config,
    ) -> Result<Arc<dyn Bridge>, Error> {
        let model = config.bridge_model()?;
        let attempts = config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match Self::connect_once(connector, &model, config).await {
                Ok(bridge) => return Ok(bridge),
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "connect attempt failed");
                    last_error = Some(e);
                    if attempt + 1 < attempts {
                        tokio::time::sleep(config.retry_delay).await;
                    }
                }
            }
        }

        Err(Error::Connection(format!(
            "Failed to connect after {} attempts: {}",
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    async fn connect_once(
        connector: &dyn Connector,
        model: &str,
        config: &Config,
    ) -> Result<Arc<dyn Bridge>, Error> {
        debug!(model, lex = %config.lex, "opening bridge");
        let bridge = timeout(config.connect_timeout, connector.connect(model, config.lex))
            .await
            .map_err(|_| Error::Timeout("Connection timeout".into()))??;
        Ok(Arc::from(bridge))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A new cursor over this connection.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.bridge.clone())
    }

    /// Close the connection. Closing twice is a no-op. Cursors opened on it
    /// stop returning rows and release their result sets on their next fetch.
    pub async fn close(&self) -> Result<(), Error> {
        let bridge = self.bridge.lock().await.take();
        if let Some(bridge) = bridge {
            bridge.close().await?;
            debug!("connection closed");
        }
        Ok(())
    }

    pub async fn is_closed(&self) -> bool {
        self.bridge.lock().await.is_none()
    }

    /// Reopen a closed connection. An open connection is left as is.
    ///
    /// The lock is only taken to install the new bridge, so cursors and
    /// `is_closed` are not held up by connect retries.
    pub async fn reconnect(&self) -> Result<(), Error> {
        if !self.is_closed().await {
            return Ok(());
        }
        let bridge = Self::connect_with_retry(self.connector.as_ref(), &self.config).await?;

        let mut guard = self.bridge.lock().await;
        if guard.is_none() {
            *guard = Some(bridge);
            return Ok(());
        }
        drop(guard);
        debug!("connection reopened concurrently, closing the extra bridge");
        bridge.close().await
    }

    /// Commit if the engine supports transactions. Failures are logged.
    pub async fn commit(&self) -> Result<(), Error> {
        let bridge = active_bridge(&self.bridge).await?;
        if let Err(e) = bridge.commit().await {
            warn!(error = %e, "transaction may not be supported");
        }
        Ok(())
    }

    /// The engine has no transactional rollback; this only logs.
    pub async fn rollback(&self) -> Result<(), Error> {
        warn!("transactional rollback is not supported");
        Ok(())
    }

    pub async fn schema_names(&self) -> Result<Vec<String>, Error> {
        active_bridge(&self.bridge).await?.schemas().await
    }

    /// Base tables in `schema`, or in every schema when `None`.
    pub async fn table_names(&self, schema: Option<&str>) -> Result<Vec<String>, Error> {
        let tables = self.tables(schema).await?;
        Ok(tables.into_iter().map(|t| t.name).collect())
    }

    /// Always empty: the engine does not report view types reliably, so
    /// views are not listed rather than listed wrongly.
    pub async fn view_names(&self, _schema: Option<&str>) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    /// Whether a base table with this name exists. Case-insensitive.
    pub async fn has_table(&self, table: &str, schema: Option<&str>) -> Result<bool, Error> {
        let tables = self.tables(schema).await?;
        Ok(tables.iter().any(|t| t.name.eq_ignore_ascii_case(table)))
    }

    /// Describe the columns of an existing table.
    pub async fn columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Vec<ReflectedColumn>, Error> {
        let bridge = active_bridge(&self.bridge).await?;
        let columns = bridge.columns(schema, table).await?;
        Ok(columns.iter().map(|c| c.reflect()).collect())
    }

    async fn tables(&self, schema: Option<&str>) -> Result<Vec<TableInfo>, Error> {
        active_bridge(&self.bridge)
            .await?
            .tables(schema, &["TABLE"])
            .await
    }
}
