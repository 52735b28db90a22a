/// CouchDB backend over HTTP.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// Embedded backend with an optional JSON snapshot.
pub mod memory;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{Collection, Document},
    storage::{StorageError, StorageResult},
};

/// Abstraction over the schema-less store holding every collection of the library.
///
/// Documents carry an `_id`/`_rev` pair. Writes are guarded by optimistic
/// concurrency: a document must be written back with the revision it was read
/// with, otherwise the store answers [`StorageError::Conflict`]. Conflicts are
/// never retried here.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id, failing with [`StorageError::NotFound`] when absent.
    fn get(&self, id: String) -> BoxFuture<'static, StorageResult<Document>>;
    /// List every document of a collection, ordered by id.
    fn list_by_collection(
        &self,
        collection: Collection,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>>;
    /// Create or update a document and return it with `_id`/`_rev` populated.
    fn upsert(&self, document: Document) -> BoxFuture<'static, StorageResult<Document>>;
    /// Delete a document at the supplied revision.
    fn remove(&self, document: Document) -> BoxFuture<'static, StorageResult<()>>;
    /// Ping the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Identifier assigned to documents saved without one.
pub fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

/// Compute the revision following `previous` (`<generation>-<hex>`), starting at generation 1.
pub fn next_revision(previous: Option<&str>) -> String {
    let generation = previous.and_then(revision_generation).unwrap_or(0) + 1;
    format!("{generation}-{}", Uuid::new_v4().simple())
}

/// Generation counter encoded in a revision token.
pub fn revision_generation(rev: &str) -> Option<u64> {
    rev.split_once('-')
        .and_then(|(generation, _)| generation.parse().ok())
}

/// Check a write against the currently stored revision.
///
/// `stored` is `None` when the id is not in the store yet.
pub(crate) fn check_revision(
    id: &str,
    supplied: Option<&str>,
    stored: Option<&str>,
) -> StorageResult<()> {
    match (supplied, stored) {
        (None, None) => Ok(()),
        (Some(supplied), Some(stored)) if supplied == stored => Ok(()),
        _ => Err(StorageError::conflict(id)),
    }
}
