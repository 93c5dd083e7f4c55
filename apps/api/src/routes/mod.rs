pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers::handle_extract_text;
use crate::generation::handlers;
use crate::state::AppState;

/// Upload ceiling for the extraction endpoint.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation gateways
        .route(
            "/api/generate-resume",
            post(handlers::handle_generate_resume),
        )
        .route(
            "/api/generate-cover-letter",
            post(handlers::handle_generate_cover_letter),
        )
        // Upload text extraction
        .route(
            "/api/extract-text",
            post(handle_extract_text).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
