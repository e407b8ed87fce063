//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - Auth, puzzle, stats, and progress endpoints (bearer token except
///   auth/health)
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth
        .route("/auth/register", post(http::http_register))
        .route("/auth/login", post(http::http_login))
        // Puzzles
        .route("/puzzles", get(http::http_list_puzzles))
        .route("/puzzles/:id/validate", post(http::http_validate))
        .route("/puzzles/:id/hint", post(http::http_hint))
        .route("/puzzles/:id/skip", post(http::http_skip))
        // Stats + progress
        .route("/stats", get(http::http_stats))
        .route("/stats/time", post(http::http_time_spent))
        .route("/progress", get(http::http_progress))
        // Liveness
        .route("/health", get(http::http_health))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
