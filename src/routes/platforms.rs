use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_valid::Valid;

use crate::{
    dao::models::Platform,
    dto::game::RevisionQuery,
    error::AppError,
    routes::with_revision,
    state::SharedState,
};

/// Platform endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/platforms", get(list_platforms).post(save_platform))
        .route("/platforms/{id}", delete(delete_platform))
}

/// List every platform.
#[utoipa::path(
    get,
    path = "/platforms",
    tag = "platforms",
    responses((status = 200, description = "Every platform", body = [Platform]))
)]
pub async fn list_platforms(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Platform>>, AppError> {
    Ok(Json(state.platforms().list().await?))
}

/// Create a platform (no `_id`) or update one (`_id` and current `_rev`).
#[utoipa::path(
    post,
    path = "/platforms",
    tag = "platforms",
    request_body = Platform,
    responses(
        (status = 200, description = "Saved platform", body = Platform),
        (status = 409, description = "Revision conflict"),
        (status = 422, description = "Invalid platform")
    )
)]
pub async fn save_platform(
    State(state): State<SharedState>,
    Valid(Json(platform)): Valid<Json<Platform>>,
) -> Result<Json<Platform>, AppError> {
    Ok(Json(state.platforms().save(platform).await?))
}

/// Delete a platform. Games and sessions referencing it are left untouched.
#[utoipa::path(
    delete,
    path = "/platforms/{id}",
    tag = "platforms",
    params(("id" = String, Path, description = "Platform identifier"), RevisionQuery),
    responses(
        (status = 204, description = "Platform deleted"),
        (status = 404, description = "Platform not found"),
        (status = 409, description = "Revision conflict")
    )
)]
pub async fn delete_platform(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<RevisionQuery>,
) -> Result<StatusCode, AppError> {
    let Some(platform) = state.platforms().get(&id).await? else {
        return Err(AppError::NotFound(format!("platform `{id}` not found")));
    };
    state
        .platforms()
        .delete(with_revision(platform, query.rev))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
