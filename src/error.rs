use thiserror::Error;

/// Main error type for the knowledge graph
#[derive(Error, Debug)]
pub enum KgError {
    /// A required field was missing or blank; the operation was not applied
    #[error("Validation error: {0}")]
    Validation(String),

    /// Delete referenced an absent entity or connection
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single bulk-ingestion row was rejected
    #[error("Row {row}: {reason}")]
    Row { row: usize, reason: String },

    /// Broken internal invariant (poisoned lock, inconsistent indexes)
    #[error("Internal error: {0}")]
    Internal(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KgError {
    /// Whether the caller supplied bad input, as opposed to a server-side fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            KgError::Validation(_) | KgError::NotFound(_) | KgError::Row { .. }
        )
    }
}

/// Convenient Result type using KgError
pub type Result<T> = std::result::Result<T, KgError>;
