//! Error types for Colloquy operations

/// Result type for Colloquy operations
pub type Result<T> = std::result::Result<T, ColloquyError>;

/// Error types for the conversation core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColloquyError {
    /// A message without content parts was offered to a conversation
    #[error("message empty")]
    EmptyMessage,

    /// LLM provider failure (transport, API or stream error)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Message store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation was cancelled before the provider finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ColloquyError {
    fn from(err: serde_json::Error) -> Self {
        ColloquyError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ColloquyError {
    fn from(err: std::io::Error) -> Self {
        ColloquyError::Io(err.to_string())
    }
}

impl From<String> for ColloquyError {
    fn from(s: String) -> Self {
        ColloquyError::Other(s)
    }
}

impl From<&str> for ColloquyError {
    fn from(s: &str) -> Self {
        ColloquyError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for ColloquyError {
    fn from(err: anyhow::Error) -> Self {
        ColloquyError::Other(err.to_string())
    }
}
