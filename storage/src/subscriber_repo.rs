//! Subscriber repository: the durable recipient directory.
//!
//! Uses SqlitePoolManager and SubscriberRecord. Implements
//! `bcast_core::SubscriberDirectory` for the dispatch engine and the
//! onboarding/admin commands.

use async_trait::async_trait;
use bcast_core::{Subscriber, SubscriberDirectory};
use tracing::info;

use crate::error::StorageError;
use crate::models::SubscriberRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SubscriberRepository {
    pool_manager: SqlitePoolManager,
}

impl SubscriberRepository {
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
        info!("Creating subscribers table if not exists");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                user_id INTEGER PRIMARY KEY,
                username TEXT,
                first_name TEXT,
                last_name TEXT,
                subscribed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(())
    }

    /// Inserts the subscriber unless the id already exists. The existing row is
    /// left untouched, so `subscribed_at` keeps its original value.
    pub async fn insert_if_absent(&self, subscriber: &Subscriber) -> Result<bool, StorageError> {
        let record = SubscriberRecord::from(subscriber);
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO subscribers (user_id, username, first_name, last_name, subscribed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(&record.username)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.subscribed_at)
        .execute(pool)
        .await
        .map_err(StorageError::Database)?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!(user_id = subscriber.id, "Subscriber registered");
        }
        Ok(inserted)
    }

    /// Deletes the subscriber if present. Safe to call concurrently for the
    /// same id; only one caller observes `true`.
    pub async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query("DELETE FROM subscribers WHERE user_id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(StorageError::Database)?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(user_id = id, "Subscriber removed");
        }
        Ok(removed)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Subscriber>, StorageError> {
        let pool = self.pool_manager.pool();

        let record: Option<SubscriberRecord> =
            sqlx::query_as("SELECT * FROM subscribers WHERE user_id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(StorageError::Database)?;

        Ok(record.map(Subscriber::from))
    }

    pub async fn all_ids(&self) -> Result<Vec<i64>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows: Vec<(i64,)> = sqlx::query_as("SELECT user_id FROM subscribers")
            .fetch_all(pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn total(&self) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers")
            .fetch_one(pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(count.0)
    }
}

#[async_trait]
impl SubscriberDirectory for SubscriberRepository {
    async fn add(&self, subscriber: &Subscriber) -> bcast_core::Result<bool> {
        Ok(self.insert_if_absent(subscriber).await?)
    }

    async fn remove(&self, id: i64) -> bcast_core::Result<bool> {
        Ok(self.delete(id).await?)
    }

    async fn get(&self, id: i64) -> bcast_core::Result<Option<Subscriber>> {
        Ok(self.find(id).await?)
    }

    async fn list_ids(&self) -> bcast_core::Result<Vec<i64>> {
        Ok(self.all_ids().await?)
    }

    async fn count(&self) -> bcast_core::Result<i64> {
        Ok(self.total().await?)
    }
}
