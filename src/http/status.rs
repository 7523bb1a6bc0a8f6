use axum::{extract::State, http::StatusCode, http::Uri, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::upload::validator;

use super::{state::AppState, timestamp};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "message": "English Word Learner API is running",
        "timestamp": timestamp(),
        "version": VERSION,
    }))
}

pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let limits = validator::limits();
    let live = !state.mode.is_mock();

    Json(json!({
        "success": true,
        "message": "Analysis service status",
        "status": {
            "openai_configured": live,
            "api_key_present": state.config.api_key_present(),
            "using_mock_service": !live,
            "supported_formats": limits.supported_formats,
            "allowed_extensions": limits.allowed_extensions,
            "max_file_size": limits.max_file_size_formatted,
            "features": {
                "word_extraction": true,
                "translation": true,
                "batch_processing": false,
                "real_ai": live,
            },
        },
        "endpoints": endpoints(),
        "timestamp": timestamp(),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn test_connection_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.tester.test_connection().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "OpenAI API connection test successful",
                "details": report,
                "timestamp": timestamp(),
            })),
        ),
        Err(e) => {
            error!(error = %e, "Connection test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "OpenAI API connection test failed",
                    "details": e.to_string(),
                    "timestamp": timestamp(),
                })),
            )
        }
    }
}

pub async fn index_handler() -> impl IntoResponse {
    Json(json!({
        "message": "English Word Learner API",
        "version": VERSION,
        "endpoints": endpoints(),
    }))
}

pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
            "path": uri.path(),
        })),
    )
}

fn endpoints() -> serde_json::Value {
    json!({
        "analyze": "POST /api/analyze",
        "test": "GET /api/test-openai",
        "status": "GET /api/status",
        "health": "GET /api/health",
    })
}
