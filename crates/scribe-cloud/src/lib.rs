//! # scribe-cloud
//!
//! Clients for the services scribe depends on:
//!
//! - [`storage`]: the [`BlobStore`] trait and its Cloud Storage implementation
//! - [`memory`]: an in-process [`BlobStore`]
//! - [`auth`]: service-account bearer tokens for storage writes
//! - [`speech`]: long-running recognition job creation and status

#![deny(unsafe_code)]

pub mod auth;
pub mod errors;
pub mod memory;
pub mod speech;
pub mod storage;

pub use auth::{STORAGE_SCOPE, ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource};
pub use errors::{AuthError, SpeechError, StoreError};
pub use memory::{MemoryBlobStore, MemoryObject};
pub use speech::{JobStatusApi, JobSubmitter, SpeechClient};
pub use storage::{BlobStore, GcsBlobStore};
