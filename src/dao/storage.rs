use std::error::Error;
use thiserror::Error;

use crate::dao::models::Collection;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No document is stored under the requested id.
    #[error("document `{id}` not found")]
    NotFound {
        /// Requested id.
        id: String,
    },
    /// The supplied revision does not match the stored one.
    #[error("revision conflict on document `{id}`")]
    Conflict {
        /// Id of the document written.
        id: String,
    },
    /// An upsert tried to move an existing document to another collection.
    #[error("document `{id}` belongs to collection `{expected}`, not `{actual}`")]
    CollectionMismatch {
        /// Id already in use.
        id: String,
        /// Collection the stored document belongs to.
        expected: Collection,
        /// Collection of the incoming document.
        actual: Collection,
    },
    /// A document could not be encoded or decoded.
    #[error("failed to (de)serialize document")]
    Serialization {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The backend could not be reached or failed to persist.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the backend was doing.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Shorthand for [`StorageError::NotFound`].
    pub fn not_found(id: impl Into<String>) -> Self {
        StorageError::NotFound { id: id.into() }
    }

    /// Shorthand for [`StorageError::Conflict`].
    pub fn conflict(id: impl Into<String>) -> Self {
        StorageError::Conflict { id: id.into() }
    }
}
