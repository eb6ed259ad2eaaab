//! Long-running speech recognition: job creation and status lookup.

use async_trait::async_trait;
use scribe_core::{JobId, Operation, RecognitionConfig, RecognizeRequest};
use tracing::{debug, instrument};

use crate::errors::{SpeechError, upstream_message};

/// Creates recognition jobs for staged audio.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Start a job for the object at `uri` and return its id.
    async fn submit(&self, uri: &str, config: &RecognitionConfig) -> Result<JobId, SpeechError>;
}

/// Reads the state of a recognition job.
#[async_trait]
pub trait JobStatusApi: Send + Sync {
    /// Fetch the operation behind `job`.
    async fn operation(&self, job: &JobId) -> Result<Operation, SpeechError>;
}

/// REST client for the `v1` speech API, authenticated by API key.
#[derive(Clone)]
pub struct SpeechClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl SpeechClient {
    /// Build a client for `base_url` (normally `https://speech.googleapis.com`).
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn read_operation(response: reqwest::Response) -> Result<Operation, SpeechError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message: upstream_message(status, &body),
            });
        }
        serde_json::from_str(&body).map_err(|e| SpeechError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl JobSubmitter for SpeechClient {
    #[instrument(skip_all, fields(uri = %uri))]
    async fn submit(&self, uri: &str, config: &RecognitionConfig) -> Result<JobId, SpeechError> {
        let url = format!("{}/v1/speech:longrunningrecognize", self.base_url);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&RecognizeRequest::new(uri, config.clone()))
            .send()
            .await?;

        let operation = Self::read_operation(response).await?;
        let job = operation
            .job_id()
            .ok_or_else(|| SpeechError::InvalidResponse("operation has no name".into()))?;
        debug!(job_id = %job, "recognition job created");
        Ok(job)
    }
}

#[async_trait]
impl JobStatusApi for SpeechClient {
    #[instrument(skip_all, fields(job_id = %job))]
    async fn operation(&self, job: &JobId) -> Result<Operation, SpeechError> {
        let url = format!("{}/v1/operations/{}", self.base_url, job);
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        Self::read_operation(response).await
    }
}
