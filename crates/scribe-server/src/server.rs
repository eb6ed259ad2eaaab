//! `ScribeServer`: Axum HTTP server for the ingest endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use scribe_cloud::{BlobStore, JobSubmitter};
use scribe_core::RecognitionConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse, IngestCounters};
use crate::ingest::ingest_handler;

/// Path of the ingest route.
pub const INGEST_PATH: &str = "/api/speech-to-text";

/// Shared state accessible from Axum handlers. Read-only apart from the
/// atomic counters.
#[derive(Clone)]
pub struct AppState {
    /// Where uploads are staged.
    pub store: Arc<dyn BlobStore>,
    /// Starts recognition jobs.
    pub submitter: Arc<dyn JobSubmitter>,
    /// Recognition parameters for every job.
    pub recognition: Arc<RecognitionConfig>,
    /// Outcome counters reported by `/health`.
    pub counters: Arc<IngestCounters>,
    /// When the server started.
    pub start_time: Instant,
}

/// The scribe ingest server.
pub struct ScribeServer {
    config: ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
}

impl ScribeServer {
    /// Create a server over the given collaborators.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn BlobStore>,
        submitter: Arc<dyn JobSubmitter>,
    ) -> Self {
        let state = AppState {
            store,
            submitter,
            recognition: Arc::new(config.recognition.clone()),
            counters: Arc::new(IngestCounters::default()),
            start_time: Instant::now(),
        };
        Self {
            config,
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the Axum router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route(INGEST_PATH, post(ingest_handler))
            .route("/health", get(health_handler))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the ingest counters.
    pub fn counters(&self) -> &Arc<IngestCounters> {
        &self.state.counters
    }

    /// Token that stops [`serve`](Self::serve) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn listen(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until the shutdown token fires.
    /// In-flight requests are allowed to finish.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        info!(%addr, max_upload_bytes = self.config.max_upload_bytes, "scribe server listening");

        let token = self.shutdown.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        info!("scribe server stopped");
        Ok(())
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, &state.counters))
}
