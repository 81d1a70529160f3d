pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/connection",
            get(handlers::handle_connection_check),
        )
        // Title generation
        .route("/api/v1/titles", post(handlers::handle_generate_title))
        .route("/api/v1/titles/batch", post(handlers::handle_batch))
        .route(
            "/api/v1/titles/batch/upload",
            post(handlers::handle_batch_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
