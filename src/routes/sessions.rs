use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};

use crate::{
    dao::models::PlaySession,
    dto::{
        game::RevisionQuery,
        session::{InferredPlaySession, PlaySessionQuery},
    },
    error::AppError,
    routes::with_revision,
    state::SharedState,
};

/// Play session endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(save_session))
        .route("/sessions/{id}", delete(delete_session))
}

/// Filtered sessions, most recent first, each enriched with its game, platform and tags.
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    params(PlaySessionQuery),
    responses((status = 200, description = "Enriched play sessions", body = [InferredPlaySession]))
)]
pub async fn list_sessions(
    State(state): State<SharedState>,
    Query(query): Query<PlaySessionQuery>,
) -> Result<Json<Vec<InferredPlaySession>>, AppError> {
    let filters = query.into_filters();
    Ok(Json(state.sessions().list_inferred(filters.as_ref()).await?))
}

/// Create or update a play session, refreshing its cached names.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    request_body = PlaySession,
    responses(
        (status = 200, description = "Saved play session", body = PlaySession),
        (status = 409, description = "Revision conflict")
    )
)]
pub async fn save_session(
    State(state): State<SharedState>,
    Json(session): Json<PlaySession>,
) -> Result<Json<PlaySession>, AppError> {
    Ok(Json(state.sessions().save(session).await?))
}

/// Delete a play session, optionally at an explicit revision.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = String, Path, description = "Play session identifier"), RevisionQuery),
    responses(
        (status = 204, description = "Play session deleted"),
        (status = 404, description = "Play session not found"),
        (status = 409, description = "Revision conflict")
    )
)]
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<RevisionQuery>,
) -> Result<StatusCode, AppError> {
    let Some(session) = state.sessions().get(&id).await? else {
        return Err(AppError::NotFound(format!("play session `{id}` not found")));
    };
    state
        .sessions()
        .delete(with_revision(session, query.rev))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
