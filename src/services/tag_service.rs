use std::{collections::HashSet, sync::Arc};

use tracing::info;
use validator::Validate;

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{Entity, Tag},
        repository::Repository,
    },
    error::ServiceError,
};

/// Colored labels shared by games and play sessions.
#[derive(Clone)]
pub struct TagService {
    tags: Repository<Tag>,
}

impl TagService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tags: Repository::new(store),
        }
    }

    /// Every tag.
    pub async fn list(&self) -> Result<Vec<Tag>, ServiceError> {
        Ok(self.tags.list().await?)
    }

    /// Tag by id, `None` when absent.
    pub async fn get(&self, id: &str) -> Result<Option<Tag>, ServiceError> {
        Ok(self.tags.find(id).await?)
    }

    /// Validate then create or update a tag.
    pub async fn save(&self, tag: Tag) -> Result<Tag, ServiceError> {
        tag.validate()?;
        let saved = self.tags.save(tag).await?;
        info!(id = ?saved.meta.id, name = %saved.name, "tag saved");
        Ok(saved)
    }

    /// Delete a tag at its current revision.
    pub async fn delete(&self, tag: Tag) -> Result<(), ServiceError> {
        Ok(self.tags.delete(tag).await?)
    }

    /// Tags whose id is in `ids`, in store order. Unknown ids are ignored.
    pub async fn tags_by_ids(&self, ids: &[String]) -> Result<Vec<Tag>, ServiceError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|tag| tag.id().is_some_and(|id| wanted.contains(id)))
            .collect())
    }
}
