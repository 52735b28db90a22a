use axum::Router;

use crate::{dao::models::Entity, state::SharedState};

/// CSV backup download and upload.
pub mod backup;
/// Swagger UI.
pub mod docs;
/// Games, stats, status history and reviews.
pub mod games;
/// Health check.
pub mod health;
/// Default-data seed.
pub mod onboarding;
/// Platform CRUD.
pub mod platforms;
/// Play session listing and CRUD.
pub mod sessions;
/// Tag CRUD.
pub mod tags;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router())
        .merge(platforms::router())
        .merge(tags::router())
        .merge(sessions::router())
        .merge(backup::router())
        .merge(onboarding::router())
        .merge(docs::router());

    api_router.with_state(state)
}

/// Use the revision supplied by the client, if any, instead of the freshly read one.
pub(crate) fn with_revision<E: Entity>(mut entity: E, rev: Option<String>) -> E {
    if let Some(rev) = rev {
        entity.meta_mut().rev = Some(rev);
    }
    entity
}
