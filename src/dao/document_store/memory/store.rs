use std::{path::PathBuf, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use tracing::{info, warn};

use super::snapshot::SnapshotFile;
use crate::dao::{
    document_store::{DocumentStore, check_revision, new_document_id, next_revision},
    models::{Collection, Document},
    storage::{StorageError, StorageResult},
};

/// Embedded document store keyed by id, optionally mirrored to a JSON snapshot file.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    documents: DashMap<String, Document>,
    snapshot: Option<SnapshotFile>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    /// Volatile store, lost when dropped.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                documents: DashMap::new(),
                snapshot: None,
            }),
        }
    }

    /// Load the store from `path` and rewrite the file after every successful write.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let snapshot = SnapshotFile::new(path.into());
        let documents = DashMap::new();
        for document in snapshot.load().await? {
            match document.id() {
                Some(id) => {
                    documents.insert(id.to_string(), document);
                }
                None => warn!(
                    path = %snapshot.path().display(),
                    collection = %document.collection(),
                    "skipping snapshot document without id"
                ),
            }
        }

        info!(
            path = %snapshot.path().display(),
            count = documents.len(),
            "loaded document snapshot"
        );

        Ok(Self {
            inner: Arc::new(MemoryInner {
                documents,
                snapshot: Some(snapshot),
            }),
        })
    }

    /// Number of stored documents across all collections.
    pub fn len(&self) -> usize {
        self.inner.documents.len()
    }

    /// Whether no document is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.documents.is_empty()
    }

    async fn persist(&self) -> StorageResult<()> {
        let Some(snapshot) = &self.inner.snapshot else {
            return Ok(());
        };
        snapshot.write(|| self.inner.sorted(|_| true)).await
    }
}

impl MemoryInner {
    fn sorted(&self, keep: impl Fn(&Document) -> bool) -> Vec<Document> {
        let mut documents = self
            .documents
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        documents.sort_by(|a, b| a.id().cmp(&b.id()));
        documents
    }

    /// Returns the stored document along with the one it replaced.
    fn apply_upsert(&self, mut document: Document) -> StorageResult<(Document, Option<Document>)> {
        let id = document
            .id()
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(new_document_id);

        // The entry guard holds the shard lock, so the compare-and-set is atomic.
        match self.documents.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                let stored = occupied.get();
                if stored.collection() != document.collection() {
                    return Err(StorageError::CollectionMismatch {
                        id,
                        expected: stored.collection(),
                        actual: document.collection(),
                    });
                }
                check_revision(&id, document.rev(), stored.rev())?;
                let rev = next_revision(stored.rev());
                let meta = document.meta_mut();
                meta.id = Some(id);
                meta.rev = Some(rev);
                let previous = occupied.insert(document.clone());
                Ok((document, Some(previous)))
            }
            Entry::Vacant(vacant) => {
                check_revision(&id, document.rev(), None)?;
                let meta = document.meta_mut();
                meta.id = Some(id);
                meta.rev = Some(next_revision(None));
                vacant.insert(document.clone());
                Ok((document, None))
            }
        }
    }

    fn apply_remove(&self, document: &Document) -> StorageResult<Document> {
        let Some(id) = document.id() else {
            return Err(StorageError::not_found(""));
        };

        match self.documents.entry(id.to_string()) {
            Entry::Occupied(occupied) => {
                check_revision(id, document.rev(), occupied.get().rev())?;
                Ok(occupied.remove())
            }
            Entry::Vacant(_) => Err(StorageError::not_found(id)),
        }
    }

    /// Undo a write whose snapshot failed, unless the id was written again since.
    ///
    /// `written_rev` is the revision the failed write left in the map, `None` after a removal.
    fn restore(&self, id: &str, written_rev: Option<&str>, previous: Option<Document>) {
        match self.documents.entry(id.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().rev() == written_rev => {
                match previous {
                    Some(previous) => {
                        occupied.insert(previous);
                    }
                    None => {
                        occupied.remove();
                    }
                }
            }
            Entry::Vacant(vacant) if written_rev.is_none() => {
                if let Some(previous) = previous {
                    vacant.insert(previous);
                }
            }
            _ => warn!(id, "document changed again before rollback, keeping the newer write"),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, id: String) -> BoxFuture<'static, StorageResult<Document>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .documents
                .get(&id)
                .map(|entry| entry.value().clone())
                .ok_or(StorageError::NotFound { id })
        })
    }

    fn list_by_collection(
        &self,
        collection: Collection,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .sorted(|document| document.collection() == collection))
        })
    }

    fn upsert(&self, document: Document) -> BoxFuture<'static, StorageResult<Document>> {
        let store = self.clone();
        Box::pin(async move {
            let (saved, previous) = store.inner.apply_upsert(document)?;
            if let Err(err) = store.persist().await {
                if let Some(id) = saved.id() {
                    store.inner.restore(id, saved.rev(), previous);
                }
                return Err(err);
            }
            Ok(saved)
        })
    }

    fn remove(&self, document: Document) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let removed = store.inner.apply_remove(&document)?;
            if let Err(err) = store.persist().await {
                if let Some(id) = removed.id() {
                    store.inner.restore(id, None, Some(removed.clone()));
                }
                return Err(err);
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
