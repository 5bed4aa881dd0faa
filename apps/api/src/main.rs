mod assistant;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod questions;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::{LlmBackend, MockLlm};
use crate::questions::repository::QuestionRepository;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SeekJob Helper API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and make sure the questions table exists
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    init_schema(&db).await?;

    // Initialize LLM backend
    let llm: Arc<dyn LlmBackend> = Arc::new(MockLlm::new(Duration::from_millis(
        config.mock_llm_latency_ms,
    )));
    info!(
        "LLM backend initialized ({}, latency {}ms)",
        llm.name(),
        config.mock_llm_latency_ms
    );

    let state = AppState {
        questions: QuestionRepository::new(db),
        llm,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
