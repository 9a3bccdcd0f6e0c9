//! Storage crate: SQLite persistence for subscribers and scheduled jobs.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – SubscriberRecord, ScheduledJobRecord
//! - [`subscriber_repo`] – SubscriberRepository (implements `SubscriberDirectory`)
//! - [`job_repo`] – ScheduledJobRepository (implements `JobStore`)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod job_repo;
mod models;
mod sqlite_pool;
mod subscriber_repo;

pub use error::StorageError;
pub use job_repo::ScheduledJobRepository;
pub use models::{ScheduledJobRecord, SubscriberRecord};
pub use sqlite_pool::SqlitePoolManager;
pub use subscriber_repo::SubscriberRepository;
