use std::{marker::PhantomData, sync::Arc};

use tracing::debug;

use crate::dao::{
    document_store::DocumentStore,
    models::Entity,
    storage::{StorageError, StorageResult},
};

/// Typed access to one collection of the shared [`DocumentStore`].
pub struct Repository<E> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    /// Repository over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Every entity of the collection, in store order.
    pub async fn list(&self) -> StorageResult<Vec<E>> {
        self.store
            .list_by_collection(E::COLLECTION)
            .await?
            .into_iter()
            .map(E::from_document)
            .collect()
    }

    /// Fetch an entity by id. Empty or absent ids and ids of another collection
    /// yield `None`; an empty id never reaches the store.
    pub async fn find(&self, id: &str) -> StorageResult<Option<E>> {
        if id.is_empty() {
            return Ok(None);
        }
        match self.store.get(id.to_string()).await {
            Ok(document) => match E::from_document(document) {
                Ok(entity) => Ok(Some(entity)),
                Err(StorageError::CollectionMismatch { actual, .. }) => {
                    debug!(id, expected = %E::COLLECTION, %actual, "id resolves to another collection");
                    Ok(None)
                }
                Err(err) => Err(err),
            },
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create (no id) or update (id + current revision) an entity.
    pub async fn save(&self, entity: E) -> StorageResult<E> {
        let saved = self.store.upsert(entity.into_document()).await?;
        E::from_document(saved)
    }

    /// Delete an entity at its current revision.
    pub async fn delete(&self, entity: E) -> StorageResult<()> {
        self.store.remove(entity.into_document()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{
        document_store::memory::MemoryDocumentStore,
        models::{Platform, Tag},
    };

    #[tokio::test]
    async fn find_treats_missing_and_foreign_ids_as_absent() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let tags = Repository::<Tag>::new(store.clone());
        let platforms = Repository::<Platform>::new(store);

        let tag = tags.save(Tag::new("Favorite")).await.unwrap();
        let tag_id = tag.meta.id.clone().unwrap();

        assert!(tags.find(&tag_id).await.unwrap().is_some());
        assert!(platforms.find(&tag_id).await.unwrap().is_none());
        assert!(tags.find("missing").await.unwrap().is_none());
        assert!(tags.find("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_only_returns_own_collection() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let tags = Repository::<Tag>::new(store.clone());
        let platforms = Repository::<Platform>::new(store);

        tags.save(Tag::new("Favorite")).await.unwrap();
        platforms
            .save(Platform {
                name: "PC".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let listed = platforms.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "PC");
    }
}
