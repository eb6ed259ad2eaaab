//! Periodic job status polling.

use std::sync::Arc;
use std::time::Duration;

use scribe_cloud::JobStatusApi;
use scribe_core::{JobId, JobStatus};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::PollError;

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job finished with a transcript.
    Resolved(String),
    /// The job failed, or a status check did. Holds the user-facing message.
    Failed(String),
    /// The loop was cancelled before the job finished.
    Cancelled,
}

/// Poll `job` every `interval` until it finishes or `cancel` fires.
///
/// The first check happens one full interval after the call. A cancelled
/// loop makes no further status calls, including one already in flight.
pub async fn run_poller(
    status: Arc<dyn JobStatusApi>,
    job: JobId,
    interval: Duration,
    cancel: CancellationToken,
) -> PollOutcome {
    let period = interval.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return PollOutcome::Cancelled,
            result = status.operation(&job) => result,
        };

        let operation = match result {
            Ok(operation) => operation,
            Err(err) => {
                let err = PollError::from(err);
                warn!(job_id = %job, error_kind = err.error_kind(), error = %err, "status check failed");
                return PollOutcome::Failed(err.user_message().to_string());
            }
        };

        match operation.status() {
            JobStatus::Pending => {
                debug!(job_id = %job, progress = ?operation.progress_percent(), "job still running");
            }
            JobStatus::Transcript(transcript) => {
                info!(job_id = %job, chars = transcript.len(), "transcript ready");
                return PollOutcome::Resolved(transcript);
            }
            JobStatus::Failed(message) => {
                warn!(job_id = %job, %message, "job failed");
                return PollOutcome::Failed(format!("Error: {message}"));
            }
        }
    }
}
