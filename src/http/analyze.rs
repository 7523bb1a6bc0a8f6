use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::{AnalysisResult, FailureKind};
use crate::error::ApiError;

use super::{state::AppState, timestamp};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
struct FileInfo {
    originalname: String,
    size: u64,
    mimetype: String,
}

fn multipart_error(err: MultipartError) -> ApiError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::TooLarge,
        status => ApiError::Multipart {
            status,
            message: err.body_text(),
        },
    }
}

#[tracing::instrument(skip_all)]
pub async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some(IMAGE_FIELD) || field.file_name().is_some() => {
                break field
            }
            Some(field) => {
                warn!(name = ?field.name(), "Ignoring non-file form field");
            }
            None => return Err(ApiError::MissingFile),
        }
    };

    let original_name = field.file_name().unwrap_or("upload").to_string();
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(multipart_error)?;

    info!(file = %original_name, mime = %mime_type, bytes = data.len(), "Processing uploaded image");

    let asset = state.uploads.save(&original_name, &mime_type, &data).await?;
    let file = FileInfo {
        originalname: original_name,
        size: asset.declared_size_bytes,
        mimetype: mime_type,
    };

    let response = match state.analyzer.analyze(asset).await {
        AnalysisResult::Success {
            message,
            words,
            translations,
            count,
        } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": message,
                "data": {
                    "words": words,
                    "translations": translations,
                    "count": count,
                },
                "file": file,
                "timestamp": timestamp(),
            })),
        ),
        AnalysisResult::Failure {
            kind: FailureKind::Validation,
            error,
            details,
        } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": error,
                "details": details,
                "file": file,
                "timestamp": timestamp(),
            })),
        ),
        AnalysisResult::Failure {
            kind: FailureKind::Internal,
            error,
            ..
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "Analysis failed",
                "details": error,
                "file": file,
                "timestamp": timestamp(),
            })),
        ),
    };

    Ok(response.into_response())
}
