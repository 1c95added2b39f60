use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::profile::extractor::ProfileError;

pub const EXTRACTION_FAILED: &str = "Failed to extract text from file.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Client errors and unexpected failures answer `{success: false, message}`;
/// AI service outages answer `{error}` with 503.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid JSON body.")]
    InvalidBody,

    #[error("Uploaded file is too large.")]
    PayloadTooLarge,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{context}: {message}")]
    Unexpected {
        context: &'static str,
        message: String,
    },
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Unavailable { .. } | ProfileError::Rejected(_) => {
                AppError::ServiceUnavailable(e.to_string())
            }
            ProfileError::ResponseParse(_) | ProfileError::EmptyResponse => AppError::Unexpected {
                context: "Server error during processing",
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let (status, body) = match &self {
            AppError::InvalidBody | AppError::Validation(_) | AppError::Extraction(_) => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "message": message}),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({"success": false, "message": message}),
            ),
            AppError::ServiceUnavailable(_) => {
                tracing::error!("{message}");
                (StatusCode::SERVICE_UNAVAILABLE, json!({"error": message}))
            }
            AppError::Unexpected { .. } => {
                tracing::error!("{self:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"success": false, "message": message}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
