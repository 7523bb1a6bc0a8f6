use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upload::validator::{format_file_size, MAX_FILE_SIZE};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid image file: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Image file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("External service error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    ExternalService {
        status: Option<u16>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failed removal of a temporary upload. Logged, never returned to a client.
#[derive(Error, Debug)]
#[error("Failed to clean up {}: {source}", .path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Request-level failures raised before the analysis pipeline runs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No image file uploaded")]
    MissingFile,

    #[error("File too large. Maximum size is {}.", format_file_size(MAX_FILE_SIZE))]
    TooLarge,

    #[error("Malformed upload: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MissingFile => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": self.to_string(),
                    "message": "Please upload an image file (JPEG, PNG, or GIF)",
                }),
            ),
            ApiError::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({
                    "success": false,
                    "error": self.to_string(),
                    "message": "Please upload a smaller image",
                }),
            ),
            ApiError::Multipart { status, message } => (
                *status,
                json!({
                    "success": false,
                    "error": "Malformed upload",
                    "details": message,
                }),
            ),
            ApiError::Storage(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "error": "Internal server error during analysis",
                    "details": e.to_string(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
