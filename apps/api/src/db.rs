use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates and returns a SQLite connection pool.
///
/// File databases are created on first use and run in WAL mode; writers that
/// find the database locked wait up to `BUSY_TIMEOUT` instead of failing.
/// In-memory URLs are pinned to a single connection that is never recycled,
/// otherwise every new connection would see its own empty database.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    info!("Connecting to SQLite at {database_url}...");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(
                options
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(BUSY_TIMEOUT),
            )
            .await?
    };

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the `questions` table and its indexes if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            question    TEXT NOT NULL,
            answer      TEXT NOT NULL,
            tags        VARCHAR(255),
            difficulty  VARCHAR(50),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_difficulty ON questions (difficulty)")
        .execute(pool)
        .await?;

    info!("Database schema ready");
    Ok(())
}

/// In-memory store with the schema applied, for tests.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
