use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_valid::Valid;

use crate::{
    dao::models::Tag,
    dto::game::RevisionQuery,
    error::AppError,
    routes::with_revision,
    state::SharedState,
};

/// Tag endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/tags", get(list_tags).post(save_tag))
        .route("/tags/{id}", delete(delete_tag))
}

/// List every tag.
#[utoipa::path(
    get,
    path = "/tags",
    tag = "tags",
    responses((status = 200, description = "Every tag", body = [Tag]))
)]
pub async fn list_tags(State(state): State<SharedState>) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(state.tags().list().await?))
}

/// Create a tag (no `_id`) or update one (`_id` and current `_rev`).
#[utoipa::path(
    post,
    path = "/tags",
    tag = "tags",
    request_body = Tag,
    responses(
        (status = 200, description = "Saved tag", body = Tag),
        (status = 409, description = "Revision conflict"),
        (status = 422, description = "Invalid tag")
    )
)]
pub async fn save_tag(
    State(state): State<SharedState>,
    Valid(Json(tag)): Valid<Json<Tag>>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(state.tags().save(tag).await?))
}

/// Delete a tag, optionally at an explicit revision.
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    tag = "tags",
    params(("id" = String, Path, description = "Tag identifier"), RevisionQuery),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Revision conflict")
    )
)]
pub async fn delete_tag(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<RevisionQuery>,
) -> Result<StatusCode, AppError> {
    let Some(tag) = state.tags().get(&id).await? else {
        return Err(AppError::NotFound(format!("tag `{id}` not found")));
    };
    state.tags().delete(with_revision(tag, query.rev)).await?;
    Ok(StatusCode::NO_CONTENT)
}
