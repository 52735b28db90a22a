use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::{
    dao::{document_store::DocumentStore, models::Platform, repository::Repository},
    error::ServiceError,
};

/// Gaming platforms referenced by games and sessions.
#[derive(Clone)]
pub struct PlatformService {
    platforms: Repository<Platform>,
}

impl PlatformService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            platforms: Repository::new(store),
        }
    }

    /// Every platform.
    pub async fn list(&self) -> Result<Vec<Platform>, ServiceError> {
        Ok(self.platforms.list().await?)
    }

    /// Platform by id, `None` when absent.
    pub async fn get(&self, id: &str) -> Result<Option<Platform>, ServiceError> {
        Ok(self.platforms.find(id).await?)
    }

    /// Validate then create or update a platform.
    pub async fn save(&self, platform: Platform) -> Result<Platform, ServiceError> {
        platform.validate()?;
        let saved = self.platforms.save(platform).await?;
        info!(id = ?saved.meta.id, name = %saved.name, "platform saved");
        Ok(saved)
    }

    /// Removes the platform only; games and sessions keep their dangling references.
    pub async fn delete(&self, platform: Platform) -> Result<(), ServiceError> {
        Ok(self.platforms.delete(platform).await?)
    }
}
