//! Scheduler: periodic polling of the job store for due broadcasts.
//!
//! Each due job is claimed by deleting it from the store before dispatch; a
//! failed or lost claim defers the job to a later tick, so a job is dispatched
//! at most once per stored copy. The tick never waits for dispatch completion.

use std::sync::Arc;
use std::time::Duration;

use bcast_core::JobStore;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::engine::DispatchEngine;

pub struct Scheduler {
    store: Arc<dyn JobStore>,
    engine: Arc<DispatchEngine>,
    poll_interval: Duration,
    startup_delay: Duration,
}

impl Scheduler {
    /// Default timing: poll every 60 s after a 10 s startup delay.
    pub fn new(store: Arc<dyn JobStore>, engine: Arc<DispatchEngine>) -> Self {
        Self {
            store,
            engine,
            poll_interval: Duration::from_secs(60),
            startup_delay: Duration::from_secs(10),
        }
    }

    pub fn with_timing(mut self, poll_interval: Duration, startup_delay: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.startup_delay = startup_delay;
        self
    }

    /// Runs the polling loop as a background task. The first poll happens after
    /// the startup delay, then every `poll_interval`.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(self.startup_delay).await;
            info!(
                poll_secs = self.poll_interval.as_secs(),
                "Scheduler started"
            );

            let mut ticker = tokio::time::interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }

    /// One polling pass: list due jobs, claim each by delete, hand the claimed
    /// drafts to the engine as background runs. A tick with nothing due is a
    /// no-op. Never returns an error; store failures only defer work.
    pub async fn tick(&self) {
        let due = match self.store.list_due(Utc::now()).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!(error = %e, "Could not poll job store");
                return;
            }
        };

        if due.is_empty() {
            debug!("Scheduler tick: nothing due");
            return;
        }

        for job in due {
            match self.store.delete(&job.id).await {
                Ok(true) => {
                    info!(job_id = %job.id, due_at = %job.due_at, "Firing scheduled broadcast");
                    self.engine.spawn(job.draft);
                }
                Ok(false) => {
                    debug!(job_id = %job.id, "Job already claimed");
                }
                Err(e) => {
                    warn!(job_id = %job.id, error = %e, "Could not claim job, deferring to next tick");
                }
            }
        }
    }
}
