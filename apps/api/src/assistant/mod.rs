// Mock AI assistant: resume optimization, interview chat, answer evaluation.
// All model calls go through llm_client::LlmBackend.

pub mod handlers;
pub mod models;
pub mod service;
