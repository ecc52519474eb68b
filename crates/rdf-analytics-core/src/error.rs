use thiserror::Error;

/// Core error type for the analytics layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The graph query facade could not answer a query
    #[error("Query error: {0}")]
    QueryError(String),

    /// The analytics store rejected or failed a write
    #[error("Store error: {0}")]
    StoreError(String),

    /// The wrapped stage failed, or was fed a batch it cannot accept
    #[error("Stage error: {0}")]
    StageError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Input/output error
    #[error("Input/output error: {0}")]
    IOError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigurationError(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::IOError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
