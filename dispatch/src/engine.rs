//! Dispatch engine: executes one confirmed draft against the full subscriber set.
//!
//! Sends are strictly sequential with a fixed inter-message pause derived from
//! the configured rate ceiling. Permanent per-recipient failures prune the
//! recipient from the directory; transient ones are only counted. Runs launched
//! with [`DispatchEngine::spawn`] carry their own error boundary so a failed run
//! is reported to the operator instead of dying silently.

use std::sync::Arc;
use std::time::Duration;

use bcast_core::{
    BroadcastDraft, BroadcastTransport, DispatchMode, DispatchReport, SendError,
    SubscriberDirectory,
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum DispatchError {
    /// The directory had no recipients; the run aborted before any send.
    #[error("no subscribers to send to")]
    EmptyRecipientSet,

    /// The directory could not be listed; the run aborted before any send.
    #[error("directory error: {0}")]
    Directory(String),

    /// The start notice to the operator could not be delivered.
    #[error("report delivery failed: {0}")]
    Report(String),
}

#[derive(Clone)]
pub struct DispatchEngine {
    transport: Arc<dyn BroadcastTransport>,
    directory: Arc<dyn SubscriberDirectory>,
    rate_limit: u32,
}

impl DispatchEngine {
    /// `rate_limit` is the messages-per-second ceiling (floor of 1).
    pub fn new(
        transport: Arc<dyn BroadcastTransport>,
        directory: Arc<dyn SubscriberDirectory>,
        rate_limit: u32,
    ) -> Self {
        Self {
            transport,
            directory,
            rate_limit: rate_limit.max(1),
        }
    }

    /// Launches `run` as a fire-and-forget background task. Any error is caught
    /// here, logged, and reported to the draft's operator; the caller never
    /// waits for the run.
    pub fn spawn(&self, draft: BroadcastDraft) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            match engine.run(&draft).await {
                Ok(report) => {
                    info!(
                        total = report.total,
                        success = report.success,
                        failure = report.failure,
                        "Broadcast run finished"
                    );
                }
                Err(DispatchError::EmptyRecipientSet) => {
                    // Already reported to the operator inside run().
                    info!("Broadcast run aborted: empty subscriber list");
                }
                Err(e) => {
                    error!(error = %e, "Broadcast run failed");
                    let notice = format!("⚠️ Broadcast failed: {}", e);
                    if let Err(notify_err) =
                        engine.transport.notify(draft.report_to, &notice).await
                    {
                        error!(error = %notify_err, "Could not report broadcast failure");
                    }
                }
            }
        })
    }

    /// Executes one dispatch run to completion. One attempt per recipient, in
    /// directory order, with a `1/rate_limit` pause between consecutive
    /// attempts.
    pub async fn run(&self, draft: &BroadcastDraft) -> Result<DispatchReport, DispatchError> {
        let recipients = self
            .directory
            .list_ids()
            .await
            .map_err(|e| DispatchError::Directory(e.to_string()))?;

        if recipients.is_empty() {
            if let Err(e) = self
                .transport
                .notify(
                    draft.report_to,
                    "The subscriber list is empty. Broadcast cancelled.",
                )
                .await
            {
                error!(error = %e, "Could not deliver empty-list notice");
            }
            return Err(DispatchError::EmptyRecipientSet);
        }

        let total = recipients.len();
        let mode = draft.mode();
        let mode_label = match mode {
            DispatchMode::Forward => "FORWARD",
            DispatchMode::Copy => "COPY",
        };

        info!(total, rate = self.rate_limit, mode = mode_label, "Broadcast starting");
        self.transport
            .notify(
                draft.report_to,
                &format!(
                    "🚀 Broadcast started\n\nMode: {}\nSending to {} subscribers at {} msg/sec.\nA final report will follow.",
                    mode_label, total, self.rate_limit
                ),
            )
            .await
            .map_err(|e| DispatchError::Report(e.to_string()))?;

        let pause = Duration::from_secs_f64(1.0 / f64::from(self.rate_limit));
        let mut success = 0usize;
        let mut failure = 0usize;

        for (i, recipient) in recipients.iter().copied().enumerate() {
            if i > 0 {
                tokio::time::sleep(pause).await;
            }

            match self
                .transport
                .send_to(recipient, &draft.content, mode, &draft.buttons)
                .await
            {
                Ok(()) => success += 1,
                Err(SendError::Permanent(reason)) => {
                    failure += 1;
                    info!(recipient, %reason, "Recipient unreachable, removing from directory");
                    if let Err(e) = self.directory.remove(recipient).await {
                        error!(recipient, error = %e, "Failed to remove unreachable recipient");
                    }
                }
                Err(SendError::Transient(reason)) => {
                    failure += 1;
                    warn!(recipient, %reason, "Send failed");
                }
            }
        }

        let report = DispatchReport {
            total,
            success,
            failure,
        };

        if let Err(e) = self
            .transport
            .notify(
                draft.report_to,
                &format!(
                    "✅ Broadcast complete\n\nDelivered: {}\nFailed: {}\n(Blocked or deactivated subscribers were removed automatically.)",
                    report.success, report.failure
                ),
            )
            .await
        {
            error!(error = %e, "Could not deliver completion report");
        }

        Ok(report)
    }
}
