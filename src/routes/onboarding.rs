use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::onboarding::SeedResponse, error::AppError, services::onboarding_service::SetupProgress,
    state::SharedState,
};

/// First-run setup endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/onboarding/defaults", post(seed_defaults))
}

/// Create the default platforms and tags that do not exist yet.
#[utoipa::path(
    post,
    path = "/onboarding/defaults",
    tag = "onboarding",
    responses((status = 200, description = "Seed tally and milestones", body = SeedResponse))
)]
pub async fn seed_defaults(State(state): State<SharedState>) -> Result<Json<SeedResponse>, AppError> {
    let mut progress = Vec::new();
    let report = state
        .onboarding()
        .seed_defaults(&mut |milestone: SetupProgress| progress.push(milestone))
        .await?;
    Ok(Json(SeedResponse { report, progress }))
}
