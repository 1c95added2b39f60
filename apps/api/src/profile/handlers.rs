//! Axum route handlers for CV processing and DOCX generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::{AppError, EXTRACTION_FAILED};
use crate::extraction::extension_of;
use crate::profile::models::CandidateProfile;
use crate::render::docx::DOCX_CONTENT_TYPE;
use crate::render::{download_filename, render_profile_docx};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProcessCvRequest {
    pub file_content: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessCvResponse {
    pub success: bool,
    pub cv_data: CandidateProfile,
}

#[derive(Debug, Deserialize)]
pub struct GenerateDocxRequest {
    pub cv_data: Option<serde_json::Value>,
}

fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge)
        }
        Err(rejection) => {
            warn!("Rejected request body: {rejection}");
            Err(AppError::InvalidBody)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /process-cv
///
/// Decodes the uploaded file, extracts its text and asks the model for a
/// FORM TECH-6 profile.
pub async fn handle_process_cv(
    State(state): State<AppState>,
    payload: Result<Json<ProcessCvRequest>, JsonRejection>,
) -> Result<Json<ProcessCvResponse>, AppError> {
    let request = read_body(payload)?;

    let (file_content, filename) = match (request.file_content, request.filename) {
        (Some(content), Some(name)) if !content.is_empty() && !name.is_empty() => (content, name),
        _ => {
            return Err(AppError::Validation(
                "File content or filename is missing.".to_string(),
            ))
        }
    };

    let span = info_span!("process_cv", request_id = %Uuid::new_v4(), filename = %filename);
    let cv_data = process_upload(&state, &file_content, &filename)
        .instrument(span)
        .await?;

    Ok(Json(ProcessCvResponse {
        success: true,
        cv_data,
    }))
}

async fn process_upload(
    state: &AppState,
    file_content: &str,
    filename: &str,
) -> Result<CandidateProfile, AppError> {
    // Line-wrapped base64 is accepted.
    let encoded: String = file_content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = BASE64.decode(encoded).map_err(|e| {
        warn!("file_content is not valid base64: {e}");
        AppError::Extraction(EXTRACTION_FAILED.to_string())
    })?;

    let cv_text = state
        .text_extractor
        .extract_or_empty(&bytes, &extension_of(filename))
        .await;
    if cv_text.is_empty() {
        return Err(AppError::Extraction(EXTRACTION_FAILED.to_string()));
    }

    Ok(state.profile_extractor.extract_profile(&cv_text).await?)
}

/// POST /generate-docx
///
/// Renders a profile as a FORM TECH-6 `.docx` download.
pub async fn handle_generate_docx(
    payload: Result<Json<GenerateDocxRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = read_body(payload)?;

    let cv_data = match request.cv_data {
        Some(value) if !is_blank(&value) => value,
        _ => return Err(AppError::Validation("CV data is missing.".to_string())),
    };
    let profile = CandidateProfile::from_json_lenient(cv_data)
        .map_err(|e| AppError::Validation(format!("CV data is invalid: {e}")))?;

    let document = render_profile_docx(&profile).map_err(|e| AppError::Unexpected {
        context: "Server error during DOCX generation",
        message: e.to_string(),
    })?;

    let disposition = format!("attachment; filename={}", download_filename(&profile.name));

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(document),
    )
        .into_response())
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
