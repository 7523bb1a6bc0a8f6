use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{warn, Level};

use crate::upload::MAX_FILE_SIZE;

use super::analyze::analyze_handler;
use super::state::AppState;
use super::status::{
    health_handler, index_handler, not_found_handler, status_handler, test_connection_handler,
};

/// Room for multipart boundaries and headers on top of the largest allowed image.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let cors = cors_layer(&state.config.frontend_url);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/test-openai", get(test_connection_handler))
        .route("/api/analyze", post(analyze_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE as usize + MULTIPART_OVERHEAD))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!(frontend_url, error = %e, "Invalid FRONTEND_URL, cross-origin requests will be refused");
            cors
        }
    }
}
