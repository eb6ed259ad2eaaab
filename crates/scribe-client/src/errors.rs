//! Client-side error types.

use scribe_cloud::SpeechError;
use thiserror::Error;

use crate::state::{POLL_FAILED_MESSAGE, SUBMIT_FAILED_MESSAGE};

/// Errors posting audio to the ingest endpoint.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Transport failure.
    #[error("ingest request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with an error and a message.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// The endpoint's answer could not be read.
    #[error("unreadable ingest response: {0}")]
    InvalidResponse(String),
}

impl SubmitError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "transport",
            Self::Rejected { .. } => "rejected",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Text shown to the user: the server's message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Http(_) | Self::InvalidResponse(_) => SUBMIT_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Errors checking job status.
#[derive(Debug, Error)]
pub enum PollError {
    /// The status call failed.
    #[error("status check failed: {0}")]
    Status(#[from] SpeechError),
}

impl PollError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Status(e) => e.error_kind(),
        }
    }

    /// Text shown to the user. Always the generic polling message.
    pub fn user_message(&self) -> &'static str {
        POLL_FAILED_MESSAGE
    }
}
