//! Error types for the DynDNS update pipeline
//!
//! Protocol-level failures (bad credentials, unknown host, no usable address,
//! rejected transaction) are not errors: they are reported through
//! [`UpdateOutcome`](crate::outcome::UpdateOutcome). This type covers what goes
//! wrong underneath them.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DynDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing file, unknown provider, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authorization provider backend failures
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// DNS update transport failures
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors (process spawning, file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
