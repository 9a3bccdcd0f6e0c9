//! Hand-written fakes for the dispatch tests: a scripted transport and
//! in-memory directory/job-store implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bcast_core::{
    BcastError, BroadcastTransport, Button, ContentRef, DispatchMode, JobStore, Membership,
    ScheduledJob, SendError, Subscriber, SubscriberDirectory,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SendRecord {
    pub recipient: i64,
    pub mode: DispatchMode,
    pub buttons: usize,
}

/// Transport fake: every send is recorded; recipients with a scripted outcome
/// fail with it, everyone else succeeds.
#[derive(Default)]
pub struct FakeTransport {
    outcomes: Mutex<HashMap<i64, SendError>>,
    sends: Mutex<Vec<SendRecord>>,
    notices: Mutex<Vec<(i64, String)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, recipient: i64, err: SendError) {
        self.outcomes.lock().unwrap().insert(recipient, err);
    }

    pub fn recorded_sends(&self) -> Vec<SendRecord> {
        self.sends.lock().unwrap().clone()
    }

    pub fn recorded_notices(&self) -> Vec<(i64, String)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl BroadcastTransport for FakeTransport {
    async fn send_to(
        &self,
        recipient: i64,
        _content: &ContentRef,
        mode: DispatchMode,
        buttons: &[Button],
    ) -> Result<(), SendError> {
        self.sends.lock().unwrap().push(SendRecord {
            recipient,
            mode,
            buttons: buttons.len(),
        });
        match self.outcomes.lock().unwrap().get(&recipient) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn notify(&self, chat: i64, text: &str) -> Result<(), SendError> {
        self.notices.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }

    async fn check_membership(&self, _group: i64, _user: i64) -> Result<Membership, SendError> {
        Ok(Membership::Member)
    }
}

/// Directory fake keeping ids in insertion order, with switchable failure modes.
#[derive(Default)]
pub struct InMemoryDirectory {
    ids: Mutex<Vec<i64>>,
    fail_list: AtomicBool,
    fail_remove: AtomicBool,
}

impl InMemoryDirectory {
    pub fn with_ids(ids: &[i64]) -> Self {
        Self {
            ids: Mutex::new(ids.to_vec()),
            ..Self::default()
        }
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_remove(&self) {
        self.fail_remove.store(true, Ordering::SeqCst);
    }

    pub fn current_ids(&self) -> Vec<i64> {
        self.ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriberDirectory for InMemoryDirectory {
    async fn add(&self, subscriber: &Subscriber) -> bcast_core::Result<bool> {
        let mut ids = self.ids.lock().unwrap();
        if ids.contains(&subscriber.id) {
            Ok(false)
        } else {
            ids.push(subscriber.id);
            Ok(true)
        }
    }

    async fn remove(&self, id: i64) -> bcast_core::Result<bool> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(BcastError::Storage("remove failed".to_string()));
        }
        let mut ids = self.ids.lock().unwrap();
        let before = ids.len();
        ids.retain(|&existing| existing != id);
        Ok(ids.len() < before)
    }

    async fn get(&self, id: i64) -> bcast_core::Result<Option<Subscriber>> {
        let ids = self.ids.lock().unwrap();
        Ok(ids
            .contains(&id)
            .then(|| Subscriber::new(id, None, None, None)))
    }

    async fn list_ids(&self) -> bcast_core::Result<Vec<i64>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BcastError::Storage("list failed".to_string()));
        }
        Ok(self.ids.lock().unwrap().clone())
    }

    async fn count(&self) -> bcast_core::Result<i64> {
        Ok(self.ids.lock().unwrap().len() as i64)
    }
}

/// Job-store fake with a switchable delete failure.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<Vec<ScheduledJob>>,
    fail_delete: AtomicBool,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<ScheduledJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: &ScheduledJob) -> bcast_core::Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }

    async fn list_due(&self, as_of: DateTime<Utc>) -> bcast_core::Result<Vec<ScheduledJob>> {
        let mut due: Vec<ScheduledJob> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|job| job.due_at <= as_of)
            .cloned()
            .collect();
        due.sort_by_key(|job| job.due_at);
        Ok(due)
    }

    async fn delete(&self, job_id: &str) -> bcast_core::Result<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BcastError::Storage("delete failed".to_string()));
        }
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|job| job.id != job_id);
        Ok(jobs.len() < before)
    }

    async fn delete_all(&self) -> bcast_core::Result<u64> {
        let mut jobs = self.jobs.lock().unwrap();
        let removed = jobs.len() as u64;
        jobs.clear();
        Ok(removed)
    }
}
