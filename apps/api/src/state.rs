use std::sync::Arc;

use crate::llm_client::LlmBackend;
use crate::questions::repository::QuestionRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub questions: QuestionRepository,
    /// Pluggable completion backend. Default: MockLlm.
    pub llm: Arc<dyn LlmBackend>,
}
