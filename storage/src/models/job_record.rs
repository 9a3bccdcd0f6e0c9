//! Scheduled-job record model for persistence.
//!
//! Maps to the `scheduled_jobs` table. Buttons are stored as a JSON string in
//! the `buttons` column.

use bcast_core::{BroadcastDraft, Button, ContentRef, ScheduledJob};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduledJobRecord {
    pub id: String,
    pub source_chat: i64,
    pub message_id: i64,
    pub buttons: String,
    pub report_to: i64,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledJobRecord {
    /// Encodes a core job for storage. Fails only if the button list cannot be
    /// serialized.
    pub fn encode(job: &ScheduledJob) -> Result<Self, StorageError> {
        let buttons = serde_json::to_string(&job.draft.buttons)
            .map_err(|e| StorageError::Decode(format!("buttons encode failed: {}", e)))?;
        Ok(Self {
            id: job.id.clone(),
            source_chat: job.draft.content.source_chat,
            message_id: i64::from(job.draft.content.message_id),
            buttons,
            report_to: job.draft.report_to,
            due_at: job.due_at,
            created_at: job.created_at,
        })
    }

    /// Decodes a stored row back into a core job.
    pub fn decode(self) -> Result<ScheduledJob, StorageError> {
        let buttons: Vec<Button> = serde_json::from_str(&self.buttons)
            .map_err(|e| StorageError::Decode(format!("buttons decode failed: {}", e)))?;
        let message_id = i32::try_from(self.message_id)
            .map_err(|_| StorageError::Decode(format!("message_id out of range: {}", self.message_id)))?;
        Ok(ScheduledJob {
            id: self.id,
            draft: BroadcastDraft {
                content: ContentRef {
                    source_chat: self.source_chat,
                    message_id,
                },
                buttons,
                report_to: self.report_to,
            },
            due_at: self.due_at,
            created_at: self.created_at,
        })
    }
}
