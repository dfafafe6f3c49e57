//! Translation of service errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::error;

use crate::backend::domain::DomainError;

/// Status code for a service error
///
/// Errors that carry no [`DomainError`] are unexpected failures (database,
/// serialization) and map to 500.
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<DomainError>() {
        Some(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(DomainError::Conflict(_)) | Some(DomainError::IngredientInUse { .. }) => {
            StatusCode::CONFLICT
        }
        Some(DomainError::ImportFailed(_)) => StatusCode::BAD_GATEWAY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log the failure and build a JSON error body
///
/// Internal errors are reported with `fallback` so database details never
/// reach the client.
pub fn error_response(context: &str, err: anyhow::Error, fallback: &str) -> Response {
    let status = status_for(&err);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{}: {:#}", context, err);
        fallback.to_string()
    } else {
        error!("{}: {}", context, err);
        err.to_string()
    };

    (status, Json(ErrorResponse { error: message })).into_response()
}
