use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage failure, surfaced unmodified (conflicts included, never retried).
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A required field is missing or a value is out of range.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Input that cannot be processed at all, such as an empty CSV file.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// CSV output could not be produced.
    #[error("CSV encoding failed")]
    Csv(#[from] csv::Error),
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Revision conflict with the stored document.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Payload is well formed but fails validation.
    #[error("unprocessable entity: {0}")]
    UnprocessableEntity(String),
    /// Storage backend unreachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => match source {
                StorageError::NotFound { .. } => AppError::NotFound(source.to_string()),
                StorageError::Conflict { .. } | StorageError::CollectionMismatch { .. } => {
                    AppError::Conflict(source.to_string())
                }
                StorageError::Unavailable { .. } => {
                    AppError::ServiceUnavailable(source.to_string())
                }
                StorageError::Serialization { .. } => AppError::Internal(source.to_string()),
            },
            ServiceError::Validation(message) => AppError::UnprocessableEntity(message),
            ServiceError::MalformedInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Csv(source) => AppError::Internal(source.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_conflicts_map_to_http_conflict() {
        let err: AppError = ServiceError::from(StorageError::conflict("g1")).into();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_errors_pass_through_services_unchanged() {
        let err = ServiceError::from(StorageError::not_found("g1"));
        assert_eq!(err.to_string(), "document `g1` not found");
    }

    #[test]
    fn malformed_input_is_a_bad_request() {
        let err: AppError = ServiceError::MalformedInput("CSV file is empty or invalid".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
