//! Remote history table access.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::history::HistoryError;
use crate::models::{HistoryEntry, HistoryRow};

/// Row-based CRUD over the remote history table, always scoped by owner.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// All entries for `owner`, newest first.
    async fn list(&self, owner: Uuid) -> Result<Vec<HistoryEntry>, HistoryError>;

    async fn insert(&self, entry: &HistoryEntry, owner: Uuid) -> Result<(), HistoryError>;

    /// Deletes every entry for `owner`; returns the number of rows removed.
    async fn delete_all(&self, owner: Uuid) -> Result<u64, HistoryError>;
}

/// PostgreSQL-backed repository over `generation_history`.
#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<HistoryEntry>, HistoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT * FROM generation_history WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} history rows for {owner}", rows.len());

        rows.into_iter()
            .map(|row| HistoryEntry::try_from(row).map_err(HistoryError::from))
            .collect()
    }

    async fn insert(&self, entry: &HistoryEntry, owner: Uuid) -> Result<(), HistoryError> {
        let row = HistoryRow::from_entry(entry, owner);
        sqlx::query(
            r#"
            INSERT INTO generation_history
                (id, user_id, kind, resume, job_description, output, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.kind)
        .bind(&row.resume)
        .bind(&row.job_description)
        .bind(&row.output)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_all(&self, owner: Uuid) -> Result<u64, HistoryError> {
        let result = sqlx::query("DELETE FROM generation_history WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
