//! Ingest error taxonomy and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scribe_cloud::{SpeechError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// Message returned when the `audio` field is missing or empty.
pub const MISSING_AUDIO_MESSAGE: &str = "No audio file provided";

/// Errors from the ingest route. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No usable `audio` field.
    #[error("{}", MISSING_AUDIO_MESSAGE)]
    MissingInput,

    /// Body exceeded the configured upload limit.
    #[error("{0}")]
    TooLarge(String),

    /// The blob store or job API rejected the request.
    #[error("{0}")]
    UpstreamFailure(String),

    /// Anything unexpected.
    #[error("{0}")]
    Internal(String),
}

impl IngestError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::TooLarge(_) => "too_large",
            Self::UpstreamFailure(_) => "upstream_failure",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        Self::UpstreamFailure(err.to_string())
    }
}

impl From<SpeechError> for IngestError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Api { .. } => Self::UpstreamFailure(err.to_string()),
            SpeechError::Http(_) | SpeechError::InvalidResponse(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for IngestError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge(err.body_text())
        } else {
            Self::Internal(err.body_text())
        }
    }
}

impl From<axum::extract::multipart::MultipartRejection> for IngestError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        Self::Internal(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
