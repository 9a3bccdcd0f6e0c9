//! Subscriber directory abstraction: the durable set of recipient identities.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Subscriber;

/// Durable recipient set. Implementations must be safe under concurrent use by
/// multiple dispatch runs; `remove` in particular is delete-if-exists.
#[async_trait]
pub trait SubscriberDirectory: Send + Sync {
    /// Inserts the subscriber if absent. Returns `false` when the id was
    /// already registered (the existing record is left untouched).
    async fn add(&self, subscriber: &Subscriber) -> Result<bool>;

    /// Removes the subscriber if present. Returns whether a record was removed;
    /// removing an absent id is not an error.
    async fn remove(&self, id: i64) -> Result<bool>;

    async fn get(&self, id: i64) -> Result<Option<Subscriber>>;

    /// All recipient ids. Dispatch processes them in the returned order; the
    /// order itself is not contractual.
    async fn list_ids(&self) -> Result<Vec<i64>>;

    async fn count(&self) -> Result<i64>;
}
