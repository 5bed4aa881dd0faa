use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://seekjob.db";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Application configuration loaded from environment variables.
/// Every variable has a local-development default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,
    /// Simulated model latency for the mock LLM, in milliseconds.
    pub mock_llm_latency_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            database_url: var("DATABASE_URL", DEFAULT_DATABASE_URL),
            db_max_connections: var("DB_MAX_CONNECTIONS", "5")
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            port: var("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            cors_origins: parse_origins(&var("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            mock_llm_latency_ms: var("MOCK_LLM_LATENCY_MS", "500")
                .parse::<u64>()
                .context("MOCK_LLM_LATENCY_MS must be a non-negative integer")?,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
