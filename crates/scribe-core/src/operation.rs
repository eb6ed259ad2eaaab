//! Speech API wire types and job status derivation.
//!
//! Covers the two JSON contracts scribe depends on:
//! - `speech:longrunningrecognize` request body ([`RecognizeRequest`])
//! - `operations/{name}` response body ([`Operation`])
//!
//! Every response field is optional on the wire; missing lists and strings
//! deserialize to empty values rather than failing the poll.

use serde::{Deserialize, Serialize};

use crate::ids::JobId;

/// Audio encodings accepted by the recognizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    /// Let the service detect the encoding (FLAC/WAV headers only).
    EncodingUnspecified,
    /// Uncompressed 16-bit signed little-endian PCM.
    Linear16,
    /// Free Lossless Audio Codec.
    Flac,
    /// 8-bit G.711 mu-law.
    Mulaw,
    /// Adaptive Multi-Rate narrowband.
    Amr,
    /// Adaptive Multi-Rate wideband.
    AmrWb,
    /// Opus in an Ogg container.
    OggOpus,
    /// Opus in a `WebM` container.
    WebmOpus,
    /// MPEG audio layer III.
    #[default]
    Mp3,
}

/// Fixed recognition parameters sent with every job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognitionConfig {
    /// Audio encoding of the staged object.
    pub encoding: AudioEncoding,
    /// Sample rate of the staged object.
    pub sample_rate_hertz: u32,
    /// BCP-47 language tag.
    pub language_code: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            encoding: AudioEncoding::Mp3,
            sample_rate_hertz: 16_000,
            language_code: "en-US".to_string(),
        }
    }
}

/// Audio reference inside a [`RecognizeRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionAudio {
    /// `gs://` URI of the staged object.
    pub uri: String,
}

/// Body of a `speech:longrunningrecognize` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizeRequest {
    /// Where the audio lives.
    pub audio: RecognitionAudio,
    /// How to recognize it.
    pub config: RecognitionConfig,
}

impl RecognizeRequest {
    /// Build a request for an object URI.
    pub fn new(uri: impl Into<String>, config: RecognitionConfig) -> Self {
        Self {
            audio: RecognitionAudio { uri: uri.into() },
            config,
        }
    }
}

/// A long-running operation as returned by create and status calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation name, the job identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the operation reached a terminal state.
    #[serde(default)]
    pub done: bool,
    /// Progress metadata, present while the job runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OperationMetadata>,
    /// Recognition result when the job succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<RecognizeResponse>,
    /// Failure detail when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

/// `LongRunningRecognizeMetadata` subset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    /// Approximate completion, 0–100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u32>,
}

/// Recognition output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    /// One entry per sequential audio segment.
    #[serde(default)]
    pub results: Vec<SegmentResult>,
}

/// Recognition output for one audio segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    /// Hypotheses, most likely first.
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// One recognition hypothesis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Recognized text.
    #[serde(default)]
    pub transcript: String,
    /// Confidence estimate, 0.0–1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Google RPC status attached to a failed call or operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Numeric status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Status of a job as seen by one poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Still running.
    Pending,
    /// Finished with a transcript.
    Transcript(String),
    /// Finished with an error message.
    Failed(String),
}

impl JobStatus {
    /// Whether polling should stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl RecognizeResponse {
    /// First alternative of every segment, newline-joined.
    ///
    /// Segments without alternatives contribute nothing.
    pub fn transcript(&self) -> String {
        self.results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Operation {
    /// Job id carried by a create response.
    pub fn job_id(&self) -> Option<JobId> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(JobId::from)
    }

    /// Derive the job status.
    ///
    /// A finished operation with a response resolves to its transcript even
    /// when the response is empty; one with neither response nor error
    /// resolves to an empty transcript.
    pub fn status(&self) -> JobStatus {
        if !self.done {
            return JobStatus::Pending;
        }
        if let Some(response) = &self.response {
            return JobStatus::Transcript(response.transcript());
        }
        match &self.error {
            Some(err) => JobStatus::Failed(err.message.clone()),
            None => JobStatus::Transcript(String::new()),
        }
    }

    /// Reported progress, if any.
    pub fn progress_percent(&self) -> Option<u32> {
        self.metadata.as_ref().and_then(|m| m.progress_percent)
    }
}
