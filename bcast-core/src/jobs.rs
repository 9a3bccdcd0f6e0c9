//! Scheduled-job store abstraction consumed by the scheduler and the confirmation flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::ScheduledJob;

/// Durable store for scheduled jobs. Jobs are immutable once stored; there is
/// no update operation.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: &ScheduledJob) -> Result<()>;

    /// Jobs whose `due_at` is at or before `as_of`, soonest first. Calling this
    /// twice without an intervening delete returns the same set.
    async fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<ScheduledJob>>;

    /// Deletes one job. Returns `false` when no job had that id (e.g. another
    /// tick already claimed it).
    async fn delete(&self, job_id: &str) -> Result<bool>;

    /// Deletes every stored job and returns how many were removed.
    async fn delete_all(&self) -> Result<u64>;
}
