use std::{future::Future, sync::Arc};

use time::UtcOffset;
use tracing::{debug, info};

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{Game, PlaySession, Platform},
        repository::Repository,
    },
    dto::session::{InferredPlaySession, PlaySessionFilters},
    error::ServiceError,
    services::{dates::now_ms, entity_map::EntityMap, session_filters, tag_service::TagService},
};

/// Number of records resolved between two yields of a batch inference.
pub const BATCH_YIELD_INTERVAL: usize = 100;

/// Play sessions and the joins that enrich them with games, platforms and tags.
#[derive(Clone)]
pub struct PlaySessionService {
    sessions: Repository<PlaySession>,
    games: Repository<Game>,
    platforms: Repository<Platform>,
    tags: TagService,
    day_offset: UtcOffset,
}

impl PlaySessionService {
    /// Service over `store`; day filters use `day_offset`.
    pub fn new(store: Arc<dyn DocumentStore>, day_offset: UtcOffset) -> Self {
        Self {
            sessions: Repository::new(store.clone()),
            games: Repository::new(store.clone()),
            platforms: Repository::new(store.clone()),
            tags: TagService::new(store),
            day_offset,
        }
    }

    /// All sessions, most recently logged first.
    pub async fn list(&self) -> Result<Vec<PlaySession>, ServiceError> {
        let mut sessions = self.sessions.list().await?;
        sessions.sort_by(|a, b| b.transaction_epoch.cmp(&a.transaction_epoch));
        Ok(sessions)
    }

    /// Session by id, `None` when absent.
    pub async fn get(&self, id: &str) -> Result<Option<PlaySession>, ServiceError> {
        Ok(self.sessions.find(id).await?)
    }

    /// Stamp `modifiedEpoch`, refresh the cached display names, then persist.
    pub async fn save(&self, mut session: PlaySession) -> Result<PlaySession, ServiceError> {
        let now = now_ms();
        if session.transaction_epoch == 0 {
            session.transaction_epoch = now;
        }
        session.modified_epoch = Some(now);

        if let Some(gaming_session) = session.gaming_session.as_mut() {
            if let Some(game) = self.games.find(&gaming_session.game_id).await? {
                gaming_session.game_name = Some(game.name);
            }
            if let Some(platform) = self.platforms.find(&gaming_session.platform_id).await? {
                gaming_session.platform_name = Some(platform.name);
            }
        }

        let saved = self.sessions.save(session).await?;
        info!(id = ?saved.meta.id, "play session saved");
        Ok(saved)
    }

    /// Delete a session at its current revision.
    pub async fn delete(&self, session: PlaySession) -> Result<(), ServiceError> {
        Ok(self.sessions.delete(session).await?)
    }

    /// Enrich one session through point lookups. Tags come back in store order.
    pub async fn infer(&self, session: &PlaySession) -> Result<InferredPlaySession, ServiceError> {
        let mut inferred = InferredPlaySession::from(session.clone());

        if let Some(gaming_session) = inferred.gaming_session.as_mut() {
            gaming_session.game = self.games.find(&gaming_session.session.game_id).await?;
            gaming_session.platform = self
                .platforms
                .find(&gaming_session.session.platform_id)
                .await?;
        }

        inferred.tag_list = self.tags.tags_by_ids(&session.tag_id_list).await?;

        Ok(inferred)
    }

    /// One listing each of tags, games and platforms.
    pub async fn build_entity_map(&self) -> Result<EntityMap, ServiceError> {
        let map = EntityMap::from_listings(
            self.tags.list().await?,
            self.games.list().await?,
            self.platforms.list().await?,
        );
        debug!(entries = map.len(), "entity map built");
        Ok(map)
    }

    /// Enrich many sessions against a single lookup map, yielding to the scheduler
    /// every [`BATCH_YIELD_INTERVAL`] records. Output order matches input order.
    pub async fn infer_in_batch(
        &self,
        sessions: &[PlaySession],
        map: Option<&EntityMap>,
    ) -> Result<Vec<InferredPlaySession>, ServiceError> {
        let built;
        let map = match map {
            Some(map) => map,
            None => {
                built = self.build_entity_map().await?;
                &built
            }
        };
        Ok(infer_with_checkpoint(sessions, map, tokio::task::yield_now).await)
    }

    /// Apply the listing filters in the configured day offset.
    pub fn apply_filters(
        &self,
        sessions: Vec<PlaySession>,
        filters: Option<&PlaySessionFilters>,
    ) -> Vec<PlaySession> {
        session_filters::apply_filters(sessions, filters, self.day_offset)
    }

    /// Filtered listing enriched in batch, as served by the API.
    pub async fn list_inferred(
        &self,
        filters: Option<&PlaySessionFilters>,
    ) -> Result<Vec<InferredPlaySession>, ServiceError> {
        let sessions = self.apply_filters(self.list().await?, filters);
        self.infer_in_batch(&sessions, None).await
    }
}

/// Resolve one session against the map. Dangling references are left absent.
pub fn resolve(session: &PlaySession, map: &EntityMap) -> InferredPlaySession {
    let mut inferred = InferredPlaySession::from(session.clone());

    if let Some(gaming_session) = inferred.gaming_session.as_mut() {
        gaming_session.game = map.game(&gaming_session.session.game_id).cloned();
        gaming_session.platform = map.platform(&gaming_session.session.platform_id).cloned();
    }

    inferred.tag_list = session
        .tag_id_list
        .iter()
        .filter_map(|id| map.tag(id).cloned())
        .collect();

    inferred
}

/// Batch resolution awaiting `checkpoint` after each record whose index is a
/// multiple of [`BATCH_YIELD_INTERVAL`].
pub async fn infer_with_checkpoint<F, Fut>(
    sessions: &[PlaySession],
    map: &EntityMap,
    mut checkpoint: F,
) -> Vec<InferredPlaySession>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut inferred = Vec::with_capacity(sessions.len());
    for (index, session) in sessions.iter().enumerate() {
        inferred.push(resolve(session, map));
        if index % BATCH_YIELD_INTERVAL == 0 {
            checkpoint().await;
        }
    }
    inferred
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;

    use super::*;
    use crate::dao::{
        document_store::memory::MemoryDocumentStore,
        models::{Collection, Document, GamingSession},
        storage::{StorageError, StorageResult},
    };

    fn service() -> PlaySessionService {
        PlaySessionService::new(Arc::new(MemoryDocumentStore::new()), UtcOffset::UTC)
    }

    /// Answers a read of the empty id with an undecodable body, the way a
    /// CouchDB server returns its database info for `GET /{db}/`.
    struct DatabaseRootStore(MemoryDocumentStore);

    impl DocumentStore for DatabaseRootStore {
        fn get(&self, id: String) -> BoxFuture<'static, StorageResult<Document>> {
            if !id.is_empty() {
                return self.0.get(id);
            }
            Box::pin(async {
                let source = serde_json::from_str::<Document>(r#"{"db_name":"playloop"}"#)
                    .unwrap_err();
                Err(StorageError::Serialization { source })
            })
        }

        fn list_by_collection(
            &self,
            collection: Collection,
        ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
            self.0.list_by_collection(collection)
        }

        fn upsert(&self, document: Document) -> BoxFuture<'static, StorageResult<Document>> {
            self.0.upsert(document)
        }

        fn remove(&self, document: Document) -> BoxFuture<'static, StorageResult<()>> {
            self.0.remove(document)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.0.health_check()
        }
    }

    #[tokio::test]
    async fn checkpoint_runs_every_hundred_records() {
        let sessions = vec![PlaySession::default(); 250];
        let mut checkpoints = 0;
        let inferred = infer_with_checkpoint(&sessions, &EntityMap::default(), || {
            checkpoints += 1;
            async {}
        })
        .await;

        assert_eq!(inferred.len(), 250);
        // indices 0, 100 and 200
        assert_eq!(checkpoints, 3);
    }

    #[tokio::test]
    async fn save_refreshes_cached_names() {
        let service = service();
        let game = service
            .games
            .save(Game {
                name: "Halo".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let saved = service
            .save(PlaySession {
                gaming_session: Some(GamingSession {
                    game_id: game.meta.id.clone().unwrap(),
                    platform_id: "gone".into(),
                    platform_name: Some("Old name".into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        let gaming_session = saved.gaming_session.unwrap();
        assert_eq!(gaming_session.game_name.as_deref(), Some("Halo"));
        // unresolved references keep their previous snapshot
        assert_eq!(gaming_session.platform_name.as_deref(), Some("Old name"));
        assert!(saved.modified_epoch.is_some());
        assert!(saved.transaction_epoch > 0);
    }

    #[tokio::test]
    async fn inference_leaves_dangling_references_absent() {
        let service = service();
        let session = PlaySession {
            tag_id_list: vec!["missing".into()],
            gaming_session: Some(GamingSession {
                game_id: "missing".into(),
                platform_id: "missing".into(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let inferred = service.infer(&session).await.unwrap();
        let gaming_session = inferred.gaming_session.unwrap();
        assert!(gaming_session.game.is_none());
        assert!(gaming_session.platform.is_none());
        assert!(inferred.tag_list.is_empty());
    }

    #[tokio::test]
    async fn session_without_platform_saves_and_infers() {
        let service = PlaySessionService::new(
            Arc::new(DatabaseRootStore(MemoryDocumentStore::new())),
            UtcOffset::UTC,
        );
        let game = service
            .games
            .save(Game {
                name: "Celeste".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let saved = service
            .save(PlaySession {
                gaming_session: Some(GamingSession {
                    game_id: game.meta.id.clone().unwrap(),
                    platform_id: String::new(),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        let cached = saved.gaming_session.as_ref().unwrap();
        assert_eq!(cached.game_name.as_deref(), Some("Celeste"));
        assert!(cached.platform_name.is_none());

        let inferred = service.infer(&saved).await.unwrap();
        let gaming_session = inferred.gaming_session.unwrap();
        assert_eq!(gaming_session.game, Some(game));
        assert!(gaming_session.platform.is_none());
    }
}
