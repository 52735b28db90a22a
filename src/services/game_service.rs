use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;
use validator::Validate;

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{Game, GameStatus, GameStatusHistory, PlaySession},
        repository::Repository,
    },
    dto::game::{GameStats, PlatformPlaytime},
    error::ServiceError,
    services::{dates::now_ms, playtime},
};

/// Games, their status history and the playtime derived from their sessions.
#[derive(Clone)]
pub struct GameService {
    games: Repository<Game>,
    history: Repository<GameStatusHistory>,
    sessions: Repository<PlaySession>,
}

impl GameService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            games: Repository::new(store.clone()),
            history: Repository::new(store.clone()),
            sessions: Repository::new(store),
        }
    }

    /// Every game.
    pub async fn list(&self) -> Result<Vec<Game>, ServiceError> {
        Ok(self.games.list().await?)
    }

    /// Game by id, `None` when absent.
    pub async fn get(&self, id: &str) -> Result<Option<Game>, ServiceError> {
        Ok(self.games.find(id).await?)
    }

    /// Fetch a game that must exist.
    pub async fn require(&self, id: &str) -> Result<Game, ServiceError> {
        self.get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
    }

    /// Validate then create or update a game.
    pub async fn save(&self, game: Game) -> Result<Game, ServiceError> {
        game.validate()?;
        let saved = self.games.save(game).await?;
        info!(id = ?saved.meta.id, name = %saved.name, "game saved");
        Ok(saved)
    }

    /// Delete a game at its current revision.
    pub async fn delete(&self, game: Game) -> Result<(), ServiceError> {
        Ok(self.games.delete(game).await?)
    }

    /// Status entries of a game, most recent first.
    pub async fn status_history(
        &self,
        game_id: &str,
        platform_id: Option<&str>,
    ) -> Result<Vec<GameStatusHistory>, ServiceError> {
        let mut entries: Vec<_> = self
            .history
            .list()
            .await?
            .into_iter()
            .filter(|entry| entry.game_id == game_id)
            .filter(|entry| platform_id.is_none_or(|p| entry.platform_id == p))
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// Latest status entry of a game on one platform.
    pub async fn current_status(
        &self,
        game_id: &str,
        platform_id: &str,
    ) -> Result<Option<GameStatusHistory>, ServiceError> {
        Ok(self
            .status_history(game_id, Some(platform_id))
            .await?
            .into_iter()
            .next())
    }

    /// Append a status entry stamped with the current time.
    pub async fn set_status(
        &self,
        game_id: &str,
        platform_id: &str,
        status: GameStatus,
        notes: Option<String>,
    ) -> Result<GameStatusHistory, ServiceError> {
        if platform_id.trim().is_empty() {
            return Err(ServiceError::Validation(
                "a platform is required to record a status".into(),
            ));
        }

        let entry = GameStatusHistory {
            meta: Default::default(),
            game_id: game_id.to_string(),
            platform_id: platform_id.to_string(),
            status,
            timestamp: now_ms(),
            notes,
        };
        let saved = self.history.save(entry).await?;
        info!(game_id, platform_id, status = status.as_str(), "game status recorded");
        Ok(saved)
    }

    /// Sessions of a game, most recently logged first.
    pub async fn sessions(
        &self,
        game_id: &str,
        platform_id: Option<&str>,
    ) -> Result<Vec<PlaySession>, ServiceError> {
        let mut sessions: Vec<_> = self
            .sessions
            .list()
            .await?
            .into_iter()
            .filter(|session| {
                session.gaming_session.as_ref().is_some_and(|gs| {
                    gs.game_id == game_id && platform_id.is_none_or(|p| gs.platform_id == p)
                })
            })
            .collect();
        sessions.sort_by(|a, b| b.transaction_epoch.cmp(&a.transaction_epoch));
        Ok(sessions)
    }

    /// Milliseconds played. The untracked baseline only counts without a platform filter.
    pub async fn total_playtime(
        &self,
        game_id: &str,
        platform_id: Option<&str>,
    ) -> Result<i64, ServiceError> {
        let sessions = self.sessions(game_id, platform_id).await?;
        let game = match platform_id {
            Some(_) => None,
            None => self.get(game_id).await?,
        };
        Ok(playtime::total_playtime(
            game.as_ref(),
            &sessions,
            platform_id.is_some(),
        ))
    }

    /// Earliest session start of a game.
    pub async fn first_played_date(&self, game_id: &str) -> Result<Option<i64>, ServiceError> {
        Ok(playtime::first_played(&self.sessions(game_id, None).await?))
    }

    /// Latest session end of a game.
    pub async fn last_played_date(&self, game_id: &str) -> Result<Option<i64>, ServiceError> {
        Ok(playtime::last_played(&self.sessions(game_id, None).await?))
    }

    /// Mean duration of the complete sessions of a game.
    pub async fn average_session_duration(&self, game_id: &str) -> Result<f64, ServiceError> {
        Ok(playtime::average_session_duration(
            &self.sessions(game_id, None).await?,
        ))
    }

    /// Playtime and session count per platform.
    pub async fn platform_breakdown(
        &self,
        game_id: &str,
    ) -> Result<IndexMap<String, PlatformPlaytime>, ServiceError> {
        Ok(playtime::platform_breakdown(
            &self.sessions(game_id, None).await?,
        ))
    }

    /// Every derived statistic of a game from a single session listing.
    pub async fn stats(&self, game_id: &str) -> Result<GameStats, ServiceError> {
        let game = self.require(game_id).await?;
        let sessions = self.sessions(game_id, None).await?;

        Ok(GameStats {
            game_id: game_id.to_string(),
            total_playtime: playtime::total_playtime(Some(&game), &sessions, false),
            first_played_date: playtime::first_played(&sessions),
            last_played_date: playtime::last_played(&sessions),
            average_session_duration: playtime::average_session_duration(&sessions),
            session_count: sessions.len(),
            platform_breakdown: playtime::platform_breakdown(&sessions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{document_store::memory::MemoryDocumentStore, models::GamingSession};

    const HOUR: i64 = 3_600_000;

    fn service() -> (GameService, Repository<PlaySession>) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        (GameService::new(store.clone()), Repository::new(store))
    }

    async fn log_session(
        sessions: &Repository<PlaySession>,
        game_id: &str,
        platform_id: &str,
        start: i64,
        end: i64,
    ) {
        sessions
            .save(PlaySession {
                transaction_epoch: end,
                gaming_session: Some(GamingSession {
                    game_id: game_id.into(),
                    platform_id: platform_id.into(),
                    start_time: Some(start),
                    end_time: Some(end),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn save_rejects_blank_names() {
        let (games, _) = service();
        let err = games.save(Game::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn get_missing_game_is_none() {
        let (games, _) = service();
        assert!(games.get("missing").await.unwrap().is_none());
        assert!(matches!(
            games.require("missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn playtime_composes_baseline_and_sessions() {
        let (games, sessions) = service();
        let game = games
            .save(Game {
                name: "Halo".into(),
                untracked_playtime: Some(10 * HOUR),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = game.meta.id.clone().unwrap();

        log_session(&sessions, &id, "p1", HOUR, 2 * HOUR).await;
        log_session(&sessions, &id, "p2", 5 * HOUR, 7 * HOUR).await;
        log_session(&sessions, "other", "p1", 0, HOUR).await;

        assert_eq!(games.total_playtime(&id, None).await.unwrap(), 13 * HOUR);
        assert_eq!(games.total_playtime(&id, Some("p1")).await.unwrap(), HOUR);
        assert_eq!(games.total_playtime(&id, Some("p2")).await.unwrap(), 2 * HOUR);

        let stats = games.stats(&id).await.unwrap();
        assert_eq!(stats.session_count, 2);
        assert_eq!(stats.average_session_duration, 1.5 * HOUR as f64);
        assert_eq!(stats.first_played_date, Some(HOUR));
        assert_eq!(stats.last_played_date, Some(7 * HOUR));
        assert_eq!(stats.platform_breakdown["p2"].playtime, 2 * HOUR);
    }

    #[tokio::test]
    async fn sessions_are_most_recent_first() {
        let (games, sessions) = service();
        log_session(&sessions, "g1", "p1", 0, HOUR).await;
        log_session(&sessions, "g1", "p1", 0, 3 * HOUR).await;
        log_session(&sessions, "g1", "p1", 0, 2 * HOUR).await;

        let epochs: Vec<_> = games
            .sessions("g1", None)
            .await
            .unwrap()
            .iter()
            .map(|s| s.transaction_epoch)
            .collect();
        assert_eq!(epochs, vec![3 * HOUR, 2 * HOUR, HOUR]);
    }

    #[tokio::test]
    async fn current_status_is_the_latest_entry() {
        let (games, _) = service();
        assert!(games.current_status("g1", "p1").await.unwrap().is_none());

        games
            .set_status("g1", "p1", GameStatus::InProgress, None)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        games
            .set_status("g1", "p1", GameStatus::Completed, Some("credits".into()))
            .await
            .unwrap();
        games
            .set_status("g1", "p2", GameStatus::Dropped, None)
            .await
            .unwrap();

        let current = games.current_status("g1", "p1").await.unwrap().unwrap();
        assert_eq!(current.status, GameStatus::Completed);
        assert_eq!(games.status_history("g1", None).await.unwrap().len(), 3);
        assert_eq!(games.status_history("g1", Some("p1")).await.unwrap().len(), 2);
    }
}
