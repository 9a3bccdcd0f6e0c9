//! Scheduled-job repository: durable persistence for deferred broadcasts.
//!
//! Uses SqlitePoolManager and ScheduledJobRecord. Implements
//! `bcast_core::JobStore` for the scheduler and the confirmation flow.
//! Jobs are immutable once stored; there is no update path.

use async_trait::async_trait;
use bcast_core::{JobStore, ScheduledJob};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::models::ScheduledJobRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ScheduledJobRepository {
    pool_manager: SqlitePoolManager,
}

impl ScheduledJobRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Builds the repository on an existing pool (shared with other repos).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating scheduled_jobs table if not exists");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scheduled_jobs (
                id TEXT PRIMARY KEY,
                source_chat INTEGER NOT NULL,
                message_id INTEGER NOT NULL,
                buttons TEXT NOT NULL,
                report_to INTEGER NOT NULL,
                due_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::Database)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_scheduled_jobs_due_at ON scheduled_jobs(due_at)")
            .execute(pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(())
    }

    pub async fn save(&self, job: &ScheduledJob) -> Result<(), StorageError> {
        let record = ScheduledJobRecord::encode(job)?;
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs (id, source_chat, message_id, buttons, report_to, due_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.source_chat)
        .bind(record.message_id)
        .bind(&record.buttons)
        .bind(record.report_to)
        .bind(record.due_at)
        .bind(record.created_at)
        .execute(pool)
        .await
        .map_err(StorageError::Database)?;

        info!(job_id = %job.id, due_at = %job.due_at, "Scheduled job stored");
        Ok(())
    }

    /// Jobs due at or before `as_of`, soonest first. Rows that fail to decode
    /// (e.g. corrupt buttons JSON) are skipped with a warning so one bad row
    /// cannot stall the scheduler.
    pub async fn due(&self, as_of: DateTime<Utc>) -> Result<Vec<ScheduledJob>, StorageError> {
        let pool = self.pool_manager.pool();

        let records: Vec<ScheduledJobRecord> =
            sqlx::query_as("SELECT * FROM scheduled_jobs WHERE due_at <= ? ORDER BY due_at ASC")
                .bind(as_of)
                .fetch_all(pool)
                .await
                .map_err(StorageError::Database)?;

        let jobs = records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                match record.decode() {
                    Ok(job) => Some(job),
                    Err(e) => {
                        warn!(job_id = %id, error = %e, "Skipping undecodable scheduled job");
                        None
                    }
                }
            })
            .collect();

        Ok(jobs)
    }

    /// Deletes one job by id. Returns whether a row was removed; concurrent
    /// deletes of the same id see `true` at most once.
    pub async fn remove(&self, job_id: &str) -> Result<bool, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query("DELETE FROM scheduled_jobs WHERE id = ?")
            .bind(job_id)
            .execute(pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every stored job in one statement and returns the count removed.
    pub async fn remove_all(&self) -> Result<u64, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query("DELETE FROM scheduled_jobs")
            .execute(pool)
            .await
            .map_err(StorageError::Database)?;

        let removed = result.rows_affected();
        info!(removed, "Cancelled all scheduled jobs");
        Ok(removed)
    }
}

#[async_trait]
impl JobStore for ScheduledJobRepository {
    async fn insert(&self, job: &ScheduledJob) -> bcast_core::Result<()> {
        Ok(self.save(job).await?)
    }

    async fn list_due(&self, as_of: DateTime<Utc>) -> bcast_core::Result<Vec<ScheduledJob>> {
        Ok(self.due(as_of).await?)
    }

    async fn delete(&self, job_id: &str) -> bcast_core::Result<bool> {
        Ok(self.remove(job_id).await?)
    }

    async fn delete_all(&self) -> bcast_core::Result<u64> {
        Ok(self.remove_all().await?)
    }
}
