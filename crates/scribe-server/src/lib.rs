//! # scribe-server
//!
//! Axum HTTP server for the ingest endpoint.
//!
//! - `POST /api/speech-to-text`: multipart `audio` field → blob store write →
//!   recognition job → `{"operationId": ...}`
//! - `GET /health`: liveness plus ingest counters
//! - Request body limit, request tracing, permissive CORS
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod ingest;
pub mod server;

pub use config::ServerConfig;
pub use error::IngestError;
pub use server::{AppState, INGEST_PATH, ScribeServer};
