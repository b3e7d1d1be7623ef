use thiserror::Error;

/// Top-level error type for Babel.
#[derive(Debug, Error)]
pub enum BabelError {
    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Boot configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Runtime settings store error.
    #[error("settings error: {0}")]
    Settings(String),

    /// Vocabulary store error.
    #[error("vocab error: {0}")]
    Vocab(String),

    /// Web search error.
    #[error("search error: {0}")]
    Search(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
