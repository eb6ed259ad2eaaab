//! `TranscribeView`: drives one submit-then-poll cycle at a time and
//! publishes every state change on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use scribe_cloud::JobStatusApi;
use scribe_core::AudioUpload;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ingest::IngestApi;
use crate::poller::{PollOutcome, run_poller};
use crate::state::{SELECT_FILE_NOTICE, ViewState};

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Poll-driven transcription client.
///
/// At most one poll task runs per view. Starting a new cycle cancels the
/// previous task and waits for it to exit, so a stale result can never
/// overwrite the new cycle's state. Dropping the view cancels polling.
pub struct TranscribeView {
    ingest: Arc<dyn IngestApi>,
    status: Arc<dyn JobStatusApi>,
    poll_interval: Duration,
    state: Arc<watch::Sender<ViewState>>,
    poll: Option<PollTask>,
}

impl TranscribeView {
    /// Create an idle view.
    pub fn new(
        ingest: Arc<dyn IngestApi>,
        status: Arc<dyn JobStatusApi>,
        poll_interval: Duration,
    ) -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Self {
            ingest,
            status,
            poll_interval,
            state: Arc::new(tx),
            poll: None,
        }
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Whether a poll task is still running.
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|p| !p.handle.is_finished())
    }

    /// Start a new cycle with `audio`.
    ///
    /// Any running poll is stopped first. Without audio the view goes back to
    /// idle with a notice and nothing is sent. Returns once the upload has
    /// been answered; polling continues in the background.
    pub async fn submit(&mut self, audio: Option<AudioUpload>) {
        self.stop_polling().await;

        let Some(audio) = audio else {
            self.publish(ViewState::Idle {
                notice: Some(SELECT_FILE_NOTICE.to_string()),
            });
            return;
        };

        self.publish(ViewState::Submitting);
        let job_id = match self.ingest.submit(audio).await {
            Ok(job_id) => job_id,
            Err(err) => {
                warn!(error_kind = err.error_kind(), error = %err, "submission failed");
                self.publish(ViewState::Failed {
                    message: err.user_message(),
                });
                return;
            }
        };

        info!(job_id = %job_id, "submission accepted, polling");
        self.publish(ViewState::Polling {
            job_id: job_id.clone(),
        });

        let cancel = CancellationToken::new();
        let status = self.status.clone();
        let interval = self.poll_interval;
        let state = self.state.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let outcome = run_poller(status, job_id.clone(), interval, token.clone()).await;
            if token.is_cancelled() {
                return;
            }
            let next = match outcome {
                PollOutcome::Resolved(transcript) => ViewState::Resolved { job_id, transcript },
                PollOutcome::Failed(message) => ViewState::Failed { message },
                PollOutcome::Cancelled => return,
            };
            let _ = state.send_replace(next);
        });
        self.poll = Some(PollTask { cancel, handle });
    }

    /// Stop polling without touching the displayed state.
    pub async fn teardown(&mut self) {
        self.stop_polling().await;
    }

    async fn stop_polling(&mut self) {
        if let Some(task) = self.poll.take() {
            task.cancel.cancel();
            if let Err(err) = task.handle.await {
                warn!(error = %err, "poll task ended abnormally");
            }
            debug!("poll task stopped");
        }
    }

    fn publish(&self, next: ViewState) {
        let _ = self.state.send_replace(next);
    }
}

impl Drop for TranscribeView {
    fn drop(&mut self) {
        if let Some(task) = self.poll.take() {
            task.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SubmitError;
    use crate::state::{POLL_FAILED_MESSAGE, SUBMIT_FAILED_MESSAGE};
    use crate::test_support::{ScriptedIngest, ScriptedStatus, sample_upload};
    use scribe_core::JobId;
    use tokio::time;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn view(ingest: &Arc<ScriptedIngest>, status: &Arc<ScriptedStatus>) -> TranscribeView {
        TranscribeView::new(ingest.clone(), status.clone(), INTERVAL)
    }

    async fn settle(rx: &mut watch::Receiver<ViewState>) -> ViewState {
        loop {
            let current = rx.borrow_and_update().clone();
            if current.is_terminal() {
                return current;
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_file_shows_notice_without_network() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(None).await;
        time::sleep(Duration::from_secs(30)).await;

        assert_eq!(
            view.state(),
            ViewState::Idle {
                notice: Some("Please select an audio file".into())
            }
        );
        assert_eq!(ingest.calls(), 0);
        assert_eq!(status.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_and_stops_polling() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![
            ScriptedStatus::pending(),
            ScriptedStatus::pending(),
            ScriptedStatus::transcript(&["hello", "world"]),
        ]);
        let mut view = view(&ingest, &status);
        let mut rx = view.subscribe();

        view.submit(Some(sample_upload())).await;
        assert_eq!(
            view.state(),
            ViewState::Polling {
                job_id: JobId::from("op-1")
            }
        );

        let done = settle(&mut rx).await;
        assert_eq!(
            done,
            ViewState::Resolved {
                job_id: JobId::from("op-1"),
                transcript: "hello\nworld".into()
            }
        );
        assert_eq!(status.calls(), 3);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(status.calls(), 3);
        assert!(!view.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_one_interval_after_submit() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;

        time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(status.calls(), 0);
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(status.calls(), 1);
        time::sleep(INTERVAL).await;
        assert_eq!(status.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn job_error_is_shown_with_prefix() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![ScriptedStatus::job_error("bad audio")]);
        let mut view = view(&ingest, &status);
        let mut rx = view.subscribe();

        view.submit(Some(sample_upload())).await;
        let done = settle(&mut rx).await;

        assert_eq!(
            done,
            ViewState::Failed {
                message: "Error: bad audio".into()
            }
        );
        assert_eq!(done.render(), "Error:\nError: bad audio");
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(status.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_shows_generic_message() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![ScriptedStatus::api_error(500, "backend error")]);
        let mut view = view(&ingest, &status);
        let mut rx = view.subscribe();

        view.submit(Some(sample_upload())).await;

        assert_eq!(
            settle(&mut rx).await,
            ViewState::Failed {
                message: POLL_FAILED_MESSAGE.into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submission_never_polls() {
        let ingest = ScriptedIngest::new(vec![Err(SubmitError::Rejected {
            status: 500,
            message: "The specified bucket does not exist.".into(),
        })]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(
            view.state(),
            ViewState::Failed {
                message: "The specified bucket does not exist.".into()
            }
        );
        assert_eq!(status.calls(), 0);
        assert!(!view.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_submission_shows_generic_message() {
        let ingest = ScriptedIngest::new(vec![Err(SubmitError::InvalidResponse("eof".into()))]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;

        assert_eq!(
            view.state(),
            ViewState::Failed {
                message: SUBMIT_FAILED_MESSAGE.into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_network_calls() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;
        time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(status.calls(), 1);

        view.teardown().await;
        assert!(!view.is_polling());
        time::sleep(Duration::from_secs(120)).await;

        assert_eq!(status.calls(), 1);
        assert_eq!(
            view.state(),
            ViewState::Polling {
                job_id: JobId::from("op-1")
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_view_stops_polling() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;
        time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(status.calls(), 1);

        drop(view);
        time::sleep(Duration::from_secs(120)).await;

        assert_eq!(status.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resubmit_replaces_the_running_cycle() {
        let ingest = ScriptedIngest::accepting(&["op-1", "op-2"]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;
        time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(status.jobs(), vec![JobId::from("op-1")]);

        view.submit(Some(sample_upload())).await;
        assert_eq!(
            view.state(),
            ViewState::Polling {
                job_id: JobId::from("op-2")
            }
        );

        time::sleep(Duration::from_secs(11)).await;
        let jobs = status.jobs();
        assert_eq!(jobs.len(), 3);
        assert!(jobs[1..].iter().all(|j| j.as_str() == "op-2"));
        assert_eq!(ingest.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_submit_while_polling_cancels_the_cycle() {
        let ingest = ScriptedIngest::accepting(&["op-1"]);
        let status = ScriptedStatus::new(vec![]);
        let mut view = view(&ingest, &status);

        view.submit(Some(sample_upload())).await;
        view.submit(None).await;
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(status.calls(), 0);
        assert_eq!(
            view.state(),
            ViewState::Idle {
                notice: Some(SELECT_FILE_NOTICE.into())
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_follow_the_cycle() {
        let ingest = ScriptedIngest::accepting(&["op-7"]);
        let status = ScriptedStatus::new(vec![ScriptedStatus::transcript(&["ok"])]);
        let mut view = view(&ingest, &status);
        let mut rx = view.subscribe();

        let watcher = tokio::spawn(async move {
            let mut seen = vec![rx.borrow_and_update().clone()];
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                let terminal = state.is_terminal();
                seen.push(state);
                if terminal {
                    break;
                }
            }
            seen
        });

        view.submit(Some(sample_upload())).await;
        let seen = watcher.await.unwrap();

        assert!(seen.contains(&ViewState::Polling {
            job_id: JobId::from("op-7")
        }));
        assert_eq!(
            seen.last(),
            Some(&ViewState::Resolved {
                job_id: JobId::from("op-7"),
                transcript: "ok".into()
            })
        );
    }
}
