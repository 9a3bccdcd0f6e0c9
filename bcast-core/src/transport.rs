//! Transport abstraction for delivering broadcasts.
//!
//! The trait keeps teloxide behind a seam; the broadcast-bot crate provides the
//! Telegram implementation, tests use scripted fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Button, ContentRef, DispatchMode};

/// Per-recipient send failure, classified by the transport adapter.
/// Classification inspects the reported reason (API error kind or text), not
/// the concrete error type of the underlying client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The recipient is unreachable for the foreseeable future (blocked the bot,
    /// account deactivated). Drives removal from the directory.
    #[error("permanent send failure: {0}")]
    Permanent(String),

    /// One-off failure (network fault, malformed request, rate violation).
    /// Counted, never prunes the recipient.
    #[error("transient send failure: {0}")]
    Transient(String),
}

/// Result of a group-membership probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Member,
    NotMember,
}

/// Sends a single message to one recipient and answers membership probes.
/// Implementations map to a concrete transport (Telegram via teloxide).
#[async_trait]
pub trait BroadcastTransport: Send + Sync {
    /// Delivers `content` to `recipient` using the given mode. Buttons are only
    /// meaningful with [`DispatchMode::Copy`].
    async fn send_to(
        &self,
        recipient: i64,
        content: &ContentRef,
        mode: DispatchMode,
        buttons: &[Button],
    ) -> Result<(), SendError>;

    /// Sends a plain status/report message to a chat (operator notices, replies).
    async fn notify(&self, chat: i64, text: &str) -> Result<(), SendError>;

    /// Checks whether `user` currently belongs to `group`. An `Err` means the
    /// probe itself failed (e.g. the bot lacks rights in the group).
    async fn check_membership(&self, group: i64, user: i64) -> Result<Membership, SendError>;
}
