pub mod health;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::assistant::handlers as assistant;
use crate::questions::handlers as questions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Question bank
        .route(
            "/api/questions/",
            get(questions::handle_list_questions).post(questions::handle_create_question),
        )
        .route(
            "/api/questions/random/",
            get(questions::handle_random_question),
        )
        .route(
            "/api/questions/:id",
            get(questions::handle_get_question)
                .put(questions::handle_update_question)
                .delete(questions::handle_delete_question),
        )
        .route(
            "/api/questions/:id/evaluate",
            post(assistant::handle_evaluate_answer),
        )
        // Mock assistant
        .route("/api/resume/optimize", post(assistant::handle_optimize_resume))
        .route("/api/interview/chat", post(assistant::handle_interview_chat))
        .with_state(state)
}

/// CORS restricted to the configured frontend origins, with credentials.
/// Methods and headers are mirrored since wildcards are not allowed alongside
/// credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
