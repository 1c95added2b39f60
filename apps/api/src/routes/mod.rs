pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::profile::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/process-cv", post(handlers::handle_process_cv))
        .route("/generate-docx", post(handlers::handle_generate_docx))
        // Base64 inflates uploads by a third; the limit applies to the encoded body.
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
