//! Error types for tabkv core.

use tabkv_codec::CodecError;
use tabkv_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in table, index and query operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A bucket or index path is malformed, or the table is missing a
    /// required capability.
    #[error("format invalid: [{path}]")]
    FormatInvalid {
        /// The offending path or capability name.
        path: String,
    },

    /// Two indexes share a name, or more than one primary key was registered.
    #[error("index conflict: [{name}]")]
    IndexConflict {
        /// The conflicting name.
        name: String,
    },

    /// An index refers to a field the record does not declare, or a query
    /// filters on a field the index does not cover.
    #[error("index [{index}] field mismatch: [{field}]")]
    IndexFieldMismatch {
        /// The index name.
        index: String,
        /// The offending field.
        field: String,
    },

    /// No index with this name, or no primary key.
    #[error("index [{name}] does not exist")]
    IndexNotFound {
        /// The requested name.
        name: String,
    },

    /// The backend could not find or open a bucket.
    #[error("bucket [{path}] open failed")]
    BucketOpenFailed {
        /// Display form of the bucket path.
        path: String,
    },

    /// A query used an unsupported comparison operator.
    #[error("compare operator [{operator}] invalid")]
    CompareOperatorInvalid {
        /// The operator as given.
        operator: String,
    },

    /// No record is stored under the requested primary key.
    #[error("data not found")]
    DataNotFound,

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// Key or record codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A caller-supplied marshal or unmarshal function failed.
    #[error("record error: {message}")]
    Record {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Create a format invalid error.
    pub fn format_invalid(path: impl Into<String>) -> Self {
        Self::FormatInvalid { path: path.into() }
    }

    /// Create an index conflict error.
    pub fn index_conflict(name: impl Into<String>) -> Self {
        Self::IndexConflict { name: name.into() }
    }

    /// Create an index field mismatch error.
    pub fn index_field_mismatch(index: impl Into<String>, field: impl Into<String>) -> Self {
        Self::IndexFieldMismatch {
            index: index.into(),
            field: field.into(),
        }
    }

    /// Create an index not found error.
    pub fn index_not_found(name: impl Into<String>) -> Self {
        Self::IndexNotFound { name: name.into() }
    }

    /// Create a compare operator invalid error.
    pub fn compare_operator_invalid(operator: impl Into<String>) -> Self {
        Self::CompareOperatorInvalid {
            operator: operator.into(),
        }
    }

    /// Create a record error.
    pub fn record(message: impl Into<String>) -> Self {
        Self::Record {
            message: message.into(),
        }
    }

    /// Returns true if the error means "no such record", as opposed to a
    /// storage or validation failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DataNotFound)
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BucketNotFound { path } => Self::BucketOpenFailed { path },
            other => Self::Storage(other),
        }
    }
}
