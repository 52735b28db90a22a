use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::AppConfig,
    dao::document_store::DocumentStore,
    services::{
        backup_service::BackupService, game_service::GameService,
        onboarding_service::OnboardingService, platform_service::PlatformService,
        play_session_service::PlaySessionService, review_service::ReviewService,
        tag_service::TagService,
    },
};

/// Handle to [`AppState`] held by every router.
pub type SharedState = Arc<AppState>;

/// Central application state: the document store and the services built on it.
///
/// Every service is constructed once here and shares the same store handle.
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    games: GameService,
    platforms: PlatformService,
    tags: TagService,
    reviews: ReviewService,
    sessions: PlaySessionService,
    backup: BackupService,
    onboarding: OnboardingService,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            games: GameService::new(store.clone()),
            platforms: PlatformService::new(store.clone()),
            tags: TagService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            sessions: PlaySessionService::new(store.clone(), config.day_offset()),
            backup: BackupService::new(store.clone()),
            onboarding: OnboardingService::new(store.clone()),
            store,
            degraded: degraded_tx,
        })
    }

    /// Document store shared by the services.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Game service.
    pub fn games(&self) -> &GameService {
        &self.games
    }

    /// Platform service.
    pub fn platforms(&self) -> &PlatformService {
        &self.platforms
    }

    /// Tag service.
    pub fn tags(&self) -> &TagService {
        &self.tags
    }

    /// Review service.
    pub fn reviews(&self) -> &ReviewService {
        &self.reviews
    }

    /// Play session service.
    pub fn sessions(&self) -> &PlaySessionService {
        &self.sessions
    }

    /// Backup service.
    pub fn backup(&self) -> &BackupService {
        &self.backup
    }

    /// Onboarding service.
    pub fn onboarding(&self) -> &OnboardingService {
        &self.onboarding
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}
