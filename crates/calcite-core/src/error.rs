use thiserror::Error;

/// Errors raised by the decoder and the dialect rewriter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A cell could not be converted under its reported type code.
    #[error("decode error: {type_name} ({code}): {message}")]
    Decode {
        code: i32,
        type_name: String,
        message: String,
    },

    /// Generic compiler output did not have the shape a rewrite rule requires.
    #[error("rewrite contract violated: {0}")]
    RewriteContract(String),

    /// The caller asked for something the driver never supports.
    #[error("not supported: {0}")]
    Unsupported(String),
}

impl CoreError {
    pub(crate) fn decode(code: i32, type_name: &str, message: impl Into<String>) -> Self {
        CoreError::Decode {
            code,
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
