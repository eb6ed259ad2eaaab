//! Scripted collaborators shared by the client tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use scribe_cloud::{JobStatusApi, SpeechError};
use scribe_core::{AudioUpload, JobId, Operation};
use serde_json::json;

use crate::errors::SubmitError;
use crate::ingest::IngestApi;

/// Status API answering from a script; pending once the script runs out.
pub(crate) struct ScriptedStatus {
    script: Mutex<VecDeque<Result<Operation, SpeechError>>>,
    jobs: Mutex<Vec<JobId>>,
}

impl ScriptedStatus {
    pub(crate) fn new(script: Vec<Result<Operation, SpeechError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            jobs: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn pending() -> Result<Operation, SpeechError> {
        Ok(serde_json::from_value(json!({ "name": "op", "metadata": { "progressPercent": 10 } }))
            .unwrap())
    }

    pub(crate) fn transcript(segments: &[&str]) -> Result<Operation, SpeechError> {
        let results: Vec<_> = segments
            .iter()
            .map(|s| json!({ "alternatives": [{ "transcript": s }] }))
            .collect();
        Ok(serde_json::from_value(json!({
            "name": "op",
            "done": true,
            "response": { "results": results }
        }))
        .unwrap())
    }

    pub(crate) fn job_error(message: &str) -> Result<Operation, SpeechError> {
        Ok(serde_json::from_value(json!({
            "name": "op",
            "done": true,
            "error": { "code": 3, "message": message }
        }))
        .unwrap())
    }

    pub(crate) fn api_error(status: u16, message: &str) -> Result<Operation, SpeechError> {
        Err(SpeechError::Api {
            status,
            message: message.to_string(),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.jobs.lock().len()
    }

    pub(crate) fn jobs(&self) -> Vec<JobId> {
        self.jobs.lock().clone()
    }
}

#[async_trait]
impl JobStatusApi for ScriptedStatus {
    async fn operation(&self, job: &JobId) -> Result<Operation, SpeechError> {
        self.jobs.lock().push(job.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(ScriptedStatus::pending)
    }
}

/// Ingest API answering from a script of job ids or errors.
pub(crate) struct ScriptedIngest {
    script: Mutex<VecDeque<Result<JobId, SubmitError>>>,
    uploads: Mutex<Vec<AudioUpload>>,
}

impl ScriptedIngest {
    pub(crate) fn new(script: Vec<Result<JobId, SubmitError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn accepting(ids: &[&str]) -> Arc<Self> {
        Self::new(ids.iter().map(|id| Ok(JobId::from(*id))).collect())
    }

    pub(crate) fn calls(&self) -> usize {
        self.uploads.lock().len()
    }
}

#[async_trait]
impl IngestApi for ScriptedIngest {
    async fn submit(&self, audio: AudioUpload) -> Result<JobId, SubmitError> {
        self.uploads.lock().push(audio);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SubmitError::InvalidResponse("script exhausted".into())))
    }
}

/// A small MP3-typed upload.
pub(crate) fn sample_upload() -> AudioUpload {
    AudioUpload::new(&b"ID3fake"[..], "audio/mpeg").with_file_name("memo.mp3")
}
