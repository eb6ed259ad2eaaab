//! # scribe-client
//!
//! Poll-driven transcription client.
//!
//! [`TranscribeView`] uploads audio through an [`IngestApi`], then polls the
//! speech API's operation status on a fixed interval until the job resolves
//! to a transcript or fails. Every state change is published as a
//! [`ViewState`] on a `tokio::sync::watch` channel.

#![deny(unsafe_code)]

pub mod errors;
pub mod ingest;
pub mod poller;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_support;

pub use errors::{PollError, SubmitError};
pub use ingest::{HttpIngestClient, IngestApi};
pub use poller::{PollOutcome, run_poller};
pub use state::{POLL_FAILED_MESSAGE, SELECT_FILE_NOTICE, SUBMIT_FAILED_MESSAGE, ViewState};
pub use view::TranscribeView;
