//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The bucket (or one of its parents) does not exist.
    #[error("bucket [{path}] not found or open failed")]
    BucketNotFound {
        /// Display form of the bucket path.
        path: String,
    },

    /// The bucket path is empty or contains an empty segment.
    #[error("invalid bucket path: {message}")]
    InvalidPath {
        /// Description of the problem.
        message: String,
    },

    /// A write was issued on a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// Stored data could not be interpreted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Creates a bucket-not-found error.
    pub fn bucket_not_found(path: impl ToString) -> Self {
        Self::BucketNotFound {
            path: path.to_string(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
        }
    }
}
