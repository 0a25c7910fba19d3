use calcite_core::CoreError;
use thiserror::Error;

/// Error type for calcite driver operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The driver itself could not be set up (bridge missing, bad arguments).
    #[error("Interface error: {0}")]
    Interface(String),

    /// The engine rejected a statement or the connection is unusable.
    #[error("Database error: {0}")]
    Database(String),

    /// The engine failed while running a statement.
    #[error("Operational error: {0}")]
    Operational(String),

    /// The caller passed a malformed statement or parameters.
    #[error("Programming error: {0}")]
    Programming(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Decoding, rewriting or unsupported-operation error from the core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Error::Core(CoreError::Unsupported(_)))
    }
}
