use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dao::models::{Game, GameStatusHistory, Review},
    dto::game::{GameStats, PlatformQuery, RevisionQuery, SetStatusRequest},
    error::AppError,
    routes::with_revision,
    state::SharedState,
};

/// Game library endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(save_game))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/stats", get(game_stats))
        .route("/games/{id}/status", get(status_history).post(set_status))
        .route("/games/{id}/review", get(get_review).put(put_review))
}

/// List every game of the library.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses((status = 200, description = "Every game of the library", body = [Game]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Result<Json<Vec<Game>>, AppError> {
    Ok(Json(state.games().list().await?))
}

/// Create a game (no `_id`) or update one (`_id` and current `_rev`).
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = Game,
    responses(
        (status = 200, description = "Saved game with its new revision", body = Game),
        (status = 409, description = "Revision conflict"),
        (status = 422, description = "Invalid game")
    )
)]
pub async fn save_game(
    State(state): State<SharedState>,
    Valid(Json(game)): Valid<Json<Game>>,
) -> Result<Json<Game>, AppError> {
    Ok(Json(state.games().save(game).await?))
}

/// Retrieve a game by its identifier.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game found", body = Game),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Game>, AppError> {
    Ok(Json(state.games().require(&id).await?))
}

/// Delete a game, optionally at an explicit revision.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier"), RevisionQuery),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Revision conflict")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<RevisionQuery>,
) -> Result<StatusCode, AppError> {
    let game = state.games().require(&id).await?;
    state.games().delete(with_revision(game, query.rev)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Playtime totals, played dates and per-platform breakdown of a game.
#[utoipa::path(
    get,
    path = "/games/{id}/stats",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Playtime statistics", body = GameStats),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_stats(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameStats>, AppError> {
    Ok(Json(state.games().stats(&id).await?))
}

/// Status history of a game, most recent first.
#[utoipa::path(
    get,
    path = "/games/{id}/status",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier"), PlatformQuery),
    responses((status = 200, description = "Status history, most recent first", body = [GameStatusHistory]))
)]
pub async fn status_history(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<PlatformQuery>,
) -> Result<Json<Vec<GameStatusHistory>>, AppError> {
    Ok(Json(
        state
            .games()
            .status_history(&id, query.platform_id.as_deref())
            .await?,
    ))
}

/// Append a status entry to a game's history.
#[utoipa::path(
    post,
    path = "/games/{id}/status",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = SetStatusRequest,
    responses(
        (status = 201, description = "Status recorded", body = GameStatusHistory),
        (status = 404, description = "Game not found")
    )
)]
pub async fn set_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<SetStatusRequest>,
) -> Result<(StatusCode, Json<GameStatusHistory>), AppError> {
    state.games().require(&id).await?;
    let entry = state
        .games()
        .set_status(&id, &request.platform_id, request.status, request.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Review of a game.
#[utoipa::path(
    get,
    path = "/games/{id}/review",
    tag = "reviews",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Review of the game", body = Review),
        (status = 404, description = "Game has no review")
    )
)]
pub async fn get_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Review>, AppError> {
    state
        .reviews()
        .review_for_game(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("game `{id}` has no review")))
}

/// Create or replace the review of a game. An existing review is updated in place.
#[utoipa::path(
    put,
    path = "/games/{id}/review",
    tag = "reviews",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = Review,
    responses(
        (status = 200, description = "Saved review", body = Review),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Revision conflict")
    )
)]
pub async fn put_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(mut review): Json<Review>,
) -> Result<Json<Review>, AppError> {
    state.games().require(&id).await?;

    // Callers own the one-review-per-game rule: reuse the existing document when there is one.
    if review.meta.id.is_none() {
        if let Some(existing) = state.reviews().review_for_game(&id).await? {
            review.meta = existing.meta;
            review.created_at = existing.created_at;
        }
    }
    review.game_id = id;

    Ok(Json(state.reviews().save(review).await?))
}
