//! `POST /api/speech-to-text`: stage the uploaded audio and start a job.

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use scribe_core::{AudioUpload, JobId, ObjectName};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::IngestError;
use crate::server::AppState;

/// Multipart field carrying the audio blob.
pub const AUDIO_FIELD: &str = "audio";

/// Success body.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// Id of the started recognition job.
    pub operation_id: JobId,
}

/// Route handler. Counts the outcome and logs failures.
pub async fn ingest_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IngestResponse>, IngestError> {
    let result: Result<JobId, IngestError> = async {
        let upload = read_audio_field(multipart?).await?;
        ingest(&state, upload).await
    }
    .await;

    match result {
        Ok(job) => {
            state.counters.record_accepted();
            Ok(Json(IngestResponse { operation_id: job }))
        }
        Err(err) => {
            state.counters.record_failed();
            warn!(error_kind = err.error_kind(), error = %err, "ingest failed");
            Err(err)
        }
    }
}

/// Pull the `audio` part out of the form. Other fields are skipped.
pub async fn read_audio_field(mut multipart: Multipart) -> Result<AudioUpload, IngestError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(IngestError::MissingInput);
        }
        let upload = AudioUpload::new(bytes, content_type);
        return Ok(match file_name {
            Some(name) => upload.with_file_name(name),
            None => upload,
        });
    }
    Err(IngestError::MissingInput)
}

/// Store the upload under a fresh name, then start a recognition job for it.
///
/// A store failure returns before any job is requested.
pub async fn ingest(state: &AppState, upload: AudioUpload) -> Result<JobId, IngestError> {
    let name = ObjectName::generate(upload.extension());
    let size = upload.len();
    let content_type = upload.content_type;

    let stored = state
        .store
        .put(&name, upload.bytes, &content_type)
        .await
        .inspect_err(|e| warn!(object = %name, error_kind = e.error_kind(), "blob write failed"))?;

    let job = state
        .submitter
        .submit(&stored.uri(), &state.recognition)
        .await
        .inspect_err(|e| warn!(object = %name, error_kind = e.error_kind(), "job submission failed"))?;

    info!(
        object = %name,
        size,
        content_type = %content_type,
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        job_id = %job,
        "audio staged, recognition started"
    );
    Ok(job)
}
