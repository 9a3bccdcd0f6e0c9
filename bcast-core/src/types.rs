//! Core types: subscriber, draft content, buttons, scheduled job, dispatch report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A broadcast recipient. `id` is the Telegram user id and is unique within the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    /// Creates a subscriber stamped with the current time.
    pub fn new(
        id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            id,
            username,
            first_name,
            last_name,
            subscribed_at: Utc::now(),
        }
    }
}

/// Reference to the message being re-delivered: the chat it lives in and its id there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub source_chat: i64,
    pub message_id: i32,
}

/// An inline URL button attached to a copied broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub url: String,
}

/// How the content is delivered to each recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Forward the original message (shows the source).
    Forward,
    /// Copy the message; required when buttons are attached.
    Copy,
}

/// A fully-specified broadcast awaiting confirmation or dispatch.
/// `report_to` is the operator chat that receives start/completion reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastDraft {
    pub content: ContentRef,
    pub buttons: Vec<Button>,
    pub report_to: i64,
}

impl BroadcastDraft {
    pub fn new(content: ContentRef, buttons: Vec<Button>, report_to: i64) -> Self {
        Self {
            content,
            buttons,
            report_to,
        }
    }

    /// Buttons cannot ride on a forwarded message, so their presence forces a copy.
    pub fn mode(&self) -> DispatchMode {
        if self.buttons.is_empty() {
            DispatchMode::Forward
        } else {
            DispatchMode::Copy
        }
    }
}

/// A durably persisted draft with an absolute due timestamp. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: String,
    pub draft: BroadcastDraft,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledJob {
    /// Creates a job with a generated UUID id. `due_at` must already be absolute
    /// (computed once at confirmation time, never recomputed from a remaining delay).
    pub fn new(draft: BroadcastDraft, due_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            draft,
            due_at,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of one dispatch run, reported back to the requesting operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_forward_without_buttons() {
        let draft = BroadcastDraft::new(
            ContentRef {
                source_chat: 1,
                message_id: 2,
            },
            vec![],
            99,
        );
        assert_eq!(draft.mode(), DispatchMode::Forward);
    }

    #[test]
    fn test_mode_copy_with_buttons() {
        let draft = BroadcastDraft::new(
            ContentRef {
                source_chat: 1,
                message_id: 2,
            },
            vec![Button {
                label: "Open".to_string(),
                url: "https://example.com".to_string(),
            }],
            99,
        );
        assert_eq!(draft.mode(), DispatchMode::Copy);
    }

    #[test]
    fn test_scheduled_job_ids_are_unique() {
        let draft = BroadcastDraft::new(
            ContentRef {
                source_chat: 1,
                message_id: 2,
            },
            vec![],
            99,
        );
        let due = Utc::now();
        let a = ScheduledJob::new(draft.clone(), due);
        let b = ScheduledJob::new(draft, due);
        assert_ne!(a.id, b.id);
    }
}
