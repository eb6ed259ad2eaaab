//! `/health` endpoint and ingest counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Uploads that produced a job id.
    pub uploads_accepted: u64,
    /// Uploads answered with an error.
    pub uploads_failed: u64,
}

/// Outcome counters for the ingest route.
#[derive(Debug, Default)]
pub struct IngestCounters {
    accepted: AtomicU64,
    failed: AtomicU64,
}

impl IngestCounters {
    /// Count a request that returned a job id.
    pub fn record_accepted(&self) {
        let _ = self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request that returned an error.
    pub fn record_failed(&self) {
        let _ = self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// `(accepted, failed)`.
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.accepted.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, counters: &IngestCounters) -> HealthResponse {
    let (accepted, failed) = counters.snapshot();
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        uploads_accepted: accepted,
        uploads_failed: failed,
    }
}
