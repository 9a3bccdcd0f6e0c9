//! Confirmation gate: holds one pending action per operator session until it is
//! confirmed, cancelled, or overwritten by a newer proposal.
//!
//! The gate never dispatches anything itself; `confirm` only releases the action
//! to the caller, which routes it to immediate dispatch or the job store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use bcast_core::BroadcastDraft;
use tracing::debug;
use uuid::Uuid;

/// What the operator is being asked to confirm.
#[derive(Debug, Clone)]
pub enum PendingAction {
    /// Send to all subscribers as soon as confirmed.
    Broadcast(BroadcastDraft),
    /// Persist a job due `delay` after confirmation.
    Schedule {
        draft: BroadcastDraft,
        delay: Duration,
    },
}

impl PendingAction {
    pub fn draft(&self) -> &BroadcastDraft {
        match self {
            PendingAction::Broadcast(draft) => draft,
            PendingAction::Schedule { draft, .. } => draft,
        }
    }
}

/// Outcome of a confirmation attempt.
#[derive(Debug)]
pub enum Confirmation {
    /// The pending action, removed from the gate. The caller now owns dispatch.
    Released(PendingAction),
    /// Nothing matched: no pending action, or the id belongs to an overwritten
    /// proposal. Distinguishes a stale button press from a real confirmation.
    Expired,
}

struct PendingEntry {
    id: String,
    action: PendingAction,
}

/// Single-slot pending state keyed by operator session (chat id). Proposing
/// always wins over whatever was pending before; only the latest proposal's id
/// can confirm or cancel.
#[derive(Default)]
pub struct ConfirmationGate {
    sessions: Mutex<HashMap<i64, PendingEntry>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the action and returns its pending id, silently discarding any
    /// prior pending action for this session (last draft wins).
    pub fn propose(&self, session: i64, action: PendingAction) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.lock();
        if let Some(prior) = sessions.insert(
            session,
            PendingEntry {
                id: id.clone(),
                action,
            },
        ) {
            debug!(session, discarded_id = %prior.id, "Overwrote pending confirmation");
        }
        id
    }

    /// Releases the pending action if `pending_id` matches the current slot.
    /// A stale id leaves a newer pending action untouched.
    pub fn confirm(&self, session: i64, pending_id: &str) -> Confirmation {
        let mut sessions = self.lock();
        match sessions.remove(&session) {
            Some(entry) if entry.id == pending_id => Confirmation::Released(entry.action),
            Some(entry) => {
                sessions.insert(session, entry);
                Confirmation::Expired
            }
            None => Confirmation::Expired,
        }
    }

    /// Discards the pending action without dispatch. Returns whether anything
    /// was discarded; a stale id leaves a newer pending action untouched.
    pub fn cancel(&self, session: i64, pending_id: &str) -> bool {
        let mut sessions = self.lock();
        match sessions.remove(&session) {
            Some(entry) if entry.id == pending_id => true,
            Some(entry) => {
                sessions.insert(session, entry);
                false
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, PendingEntry>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
