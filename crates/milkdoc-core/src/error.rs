use thiserror::Error;

/// Top-level error type for the milkdoc system.
///
/// Backend adapters report failures with this type. The answering pipeline
/// maps it into its own per-stage taxonomy so callers can tell a failed
/// search apart from a failed completion.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MilkdocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Backend rejected request: {0}")]
    Backend(String),

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

impl From<toml::de::Error> for MilkdocError {
    fn from(err: toml::de::Error) -> Self {
        MilkdocError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MilkdocError {
    fn from(err: toml::ser::Error) -> Self {
        MilkdocError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MilkdocError {
    fn from(err: serde_json::Error) -> Self {
        MilkdocError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for milkdoc operations.
pub type Result<T> = std::result::Result<T, MilkdocError>;
