//! Subscriber record model for persistence.
//!
//! Maps to the `subscribers` table and is used by SubscriberRepository.

use bcast_core::Subscriber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubscriberRecord {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscribed_at: DateTime<Utc>,
}

impl From<&Subscriber> for SubscriberRecord {
    fn from(s: &Subscriber) -> Self {
        Self {
            user_id: s.id,
            username: s.username.clone(),
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            subscribed_at: s.subscribed_at,
        }
    }
}

impl From<SubscriberRecord> for Subscriber {
    fn from(r: SubscriberRecord) -> Self {
        Subscriber {
            id: r.user_id,
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            subscribed_at: r.subscribed_at,
        }
    }
}
