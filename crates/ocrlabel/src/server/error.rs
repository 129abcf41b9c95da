use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use ocrlabel_core::CoreError;

// ==============================================================================
// Error Type
// ==============================================================================

pub(crate) enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub(super) fn map_core_error(err: CoreError) -> AppError {
    match err {
        CoreError::InvalidPath(_)
        | CoreError::UnsupportedExtension(_)
        | CoreError::InvalidLabel(_) => AppError::BadRequest(err.to_string()),
        CoreError::ImageNotFound(_) | CoreError::LabelNotFound(_) => {
            AppError::NotFound(err.to_string())
        }
        CoreError::StoreUnavailable { .. } => {
            tracing::error!(error = %err, "label store operation failed");
            AppError::Unavailable(err.to_string())
        }
    }
}
