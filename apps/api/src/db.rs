use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const CREATE_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS generation_history (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL,
    kind            TEXT NOT NULL CHECK (kind IN ('resume', 'cover')),
    resume          TEXT NOT NULL,
    job_description TEXT NOT NULL,
    output          TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_HISTORY_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS generation_history_user_created_idx
    ON generation_history (user_id, created_at DESC)
"#;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the history table and its index if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_HISTORY_TABLE).execute(pool).await?;
    sqlx::query(CREATE_HISTORY_INDEX).execute(pool).await?;
    Ok(())
}
