use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use time::OffsetDateTime;

use crate::{
    dto::backup::ImportReport,
    error::AppError,
    services::backup_service::{CSV_CONTENT_TYPE, backup_file_name},
    state::SharedState,
};

/// CSV backup endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/backup/export", get(export_backup))
        .route("/backup/import", post(import_backup))
}

/// Download the library as a CSV file.
#[utoipa::path(
    get,
    path = "/backup/export",
    tag = "backup",
    responses((status = 200, description = "CSV backup", content_type = "text/csv", body = String))
)]
pub async fn export_backup(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let csv = state.backup().export_csv().await?;
    let file_name = backup_file_name(OffsetDateTime::now_utc().date());

    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    ))
}

/// Merge a CSV backup into the library. Row failures are listed in the report.
#[utoipa::path(
    post,
    path = "/backup/import",
    tag = "backup",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import tally", body = ImportReport),
        (status = 400, description = "Empty or unreadable CSV")
    )
)]
pub async fn import_backup(
    State(state): State<SharedState>,
    body: String,
) -> Result<Json<ImportReport>, AppError> {
    Ok(Json(state.backup().import_csv(&body).await?))
}
