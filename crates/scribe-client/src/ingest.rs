//! Posting audio to the ingest endpoint.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use scribe_core::{AudioUpload, JobId};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::SubmitError;

/// Submits audio and returns the id of the job it started.
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Upload `audio` as a new transcription job.
    async fn submit(&self, audio: AudioUpload) -> Result<JobId, SubmitError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accepted {
    operation_id: String,
}

#[derive(Deserialize)]
struct Rejected {
    message: String,
}

/// [`IngestApi`] over HTTP: multipart `audio` field to `POST /api/speech-to-text`.
#[derive(Clone, Debug)]
pub struct HttpIngestClient {
    client: reqwest::Client,
    url: String,
}

impl HttpIngestClient {
    /// Client posting to the full ingest `url`.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IngestApi for HttpIngestClient {
    #[instrument(skip_all, fields(url = %self.url, size = audio.len()))]
    async fn submit(&self, audio: AudioUpload) -> Result<JobId, SubmitError> {
        let file_name = audio.file_name.clone().unwrap_or_else(|| "audio".to_string());
        let part = Part::bytes(audio.bytes.to_vec())
            .file_name(file_name)
            .mime_str(&audio.content_type)?;
        let form = Form::new().part("audio", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let accepted: Accepted = serde_json::from_str(&body)
                .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;
            debug!(job_id = %accepted.operation_id, "upload accepted");
            return Ok(JobId::from(accepted.operation_id));
        }

        let rejected: Rejected = serde_json::from_str(&body)
            .map_err(|e| SubmitError::InvalidResponse(format!("{status}: {e}")))?;
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            message: rejected.message,
        })
    }
}
