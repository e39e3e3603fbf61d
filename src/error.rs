//! Error types for the batch scheduler

use thiserror::Error;

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Batch scheduler error types
#[derive(Error, Debug)]
pub enum BatchError {
    /// A bulk write against the record store failed.
    ///
    /// The batch that failed is dropped and reported once through the
    /// error callback; retry policy belongs to the caller.
    #[error("Store write failed: {0}")]
    StoreWrite(String),

    /// Record payload could not be serialized or patched
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Scheduler constructed with an invalid configuration
    #[error("Invalid configuration: {0}")]
    Misconfigured(String),

    /// Enqueue attempted after the scheduler was shut down
    #[error("Scheduler is shut down")]
    Closed,
}

impl From<serde_json::Error> for BatchError {
    fn from(err: serde_json::Error) -> Self {
        BatchError::Serialization(err.to_string())
    }
}
