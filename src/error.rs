use thiserror::Error;

/// Main error type for translation memory operations
#[derive(Error, Debug)]
pub enum TmError {
    #[error("Unsupported language direction: {0}")]
    UnsupportedDirection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Invalid query: {0}")]
    Query(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Translation memory is closed")]
    Closed,
}

/// Result type alias for translation memory operations
pub type Result<T> = std::result::Result<T, TmError>;

impl TmError {
    /// Check if this error comes from the backing storage.
    ///
    /// Persistence errors roll back the in-flight transaction before they
    /// reach the caller.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            TmError::Io(_) | TmError::Serialization(_) | TmError::Storage(_) | TmError::Corrupt(_)
        )
    }
}
