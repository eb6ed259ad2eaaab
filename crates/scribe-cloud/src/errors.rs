//! Error types for the external collaborators.

use thiserror::Error;

/// Errors obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Key file could not be read.
    #[error("failed to read credentials file: {0}")]
    Io(#[from] std::io::Error),

    /// Key file is not a service-account key.
    #[error("invalid credentials file: {0}")]
    InvalidKey(String),

    /// Signing the assertion failed.
    #[error("failed to sign token assertion: {0}")]
    Signing(String),

    /// Token endpoint unreachable or unreadable.
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Token endpoint refused the exchange.
    #[error("token exchange failed ({status}): {message}")]
    Exchange {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },
}

/// Errors writing to the blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No usable credentials.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Transport failure.
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the write. Displays the store's own message.
    #[error("{message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Message reported by the store.
        message: String,
    },
}

impl StoreError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Http(_) => "transport",
            Self::Upstream { .. } => "upstream",
        }
    }
}

/// Errors talking to the speech API.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Transport failure.
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status. Displays its message.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the API.
        message: String,
    },

    /// The API answered with a body scribe cannot interpret.
    #[error("unexpected speech API response: {0}")]
    InvalidResponse(String),
}

impl SpeechError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "transport",
            Self::Api { .. } => "api",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the
/// raw body (or the status line when the body is empty).
pub(crate) fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: scribe_core::OperationError,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(env) if !env.error.message.is_empty() => env.error.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("upstream returned {status}"),
    }
}
