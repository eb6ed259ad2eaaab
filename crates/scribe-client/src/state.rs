//! What the user sees, one variant per phase of a transcription cycle.

use scribe_core::JobId;

/// Shown when submit is pressed without a file.
pub const SELECT_FILE_NOTICE: &str = "Please select an audio file";
/// Shown when the ingest call fails without a server message.
pub const SUBMIT_FAILED_MESSAGE: &str = "Error submitting the file";
/// Shown when a status poll fails.
pub const POLL_FAILED_MESSAGE: &str = "Error polling the operation status";

/// Display state of a [`TranscribeView`](crate::TranscribeView).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing in flight. `notice` holds a validation message, if any.
    Idle {
        /// Validation message from the last submit attempt.
        notice: Option<String>,
    },
    /// Upload in progress.
    Submitting,
    /// Job accepted; waiting for it to finish.
    Polling {
        /// Job being followed.
        job_id: JobId,
    },
    /// Job finished with a transcript.
    Resolved {
        /// Job that produced the transcript.
        job_id: JobId,
        /// Newline-joined transcript.
        transcript: String,
    },
    /// The cycle ended in an error.
    Failed {
        /// User-facing message.
        message: String,
    },
}

impl Default for ViewState {
    fn default() -> Self {
        Self::Idle { notice: None }
    }
}

impl ViewState {
    /// Whether the cycle has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved { .. } | Self::Failed { .. })
    }

    /// Job id for the current cycle, once known.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Polling { job_id } | Self::Resolved { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    /// Text block for this state. Empty when there is nothing to show.
    pub fn render(&self) -> String {
        match self {
            Self::Idle { notice: None } => String::new(),
            Self::Idle {
                notice: Some(message),
            }
            | Self::Failed { message } => format!("Error:\n{message}"),
            Self::Submitting => "Uploading...".to_string(),
            Self::Polling { job_id } => format!(
                "Processing...\nYour audio is being transcribed. Operation ID: {job_id}"
            ),
            Self::Resolved { transcript, .. } => format!("Transcription:\n{transcript}"),
        }
    }
}
