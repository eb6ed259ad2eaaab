//! # scribe
//!
//! `scribe serve` runs the ingest endpoint. `scribe transcribe <file>`
//! uploads a file to a running server and follows the job to a transcript.

#![deny(unsafe_code)]

mod wiring;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribe_client::{HttpIngestClient, SELECT_FILE_NOTICE, TranscribeView, ViewState};
use scribe_core::logging::{LogFormat, init_subscriber};
use scribe_core::{AudioUpload, content_type_for_path};
use scribe_server::{ScribeServer, ServerConfig};
use scribe_settings::ScribeSettings;
use tokio::net::TcpListener;

/// Speech-to-text over an upload-then-poll pipeline.
#[derive(Parser, Debug)]
#[command(name = "scribe", about = "Upload audio, transcribe it, poll for the result")]
struct Cli {
    /// Settings file (default `~/.scribe/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the ingest server until ctrl-c.
    Serve {
        /// Host to bind (overrides settings).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides settings).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Submit an audio file and wait for its transcript.
    Transcribe {
        /// Audio file to upload.
        file: Option<PathBuf>,
        /// Ingest server origin (overrides settings).
        #[arg(long)]
        server_url: Option<String>,
    },
}

fn load_settings(path: Option<&Path>) -> Result<ScribeSettings> {
    match path {
        Some(path) => scribe_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => scribe_settings::load_settings().context("Failed to load settings"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.settings.as_deref())?;

    let format = if settings.logging.json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_subscriber(&settings.logging.level, format);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            serve(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Transcribe { file, server_url } => {
            if let Some(url) = server_url {
                settings.client.server_url = url;
            }
            transcribe(settings, file.as_deref()).await
        }
    }
}

async fn serve(settings: ScribeSettings) -> Result<()> {
    settings
        .validate_for_server()
        .context("Server settings are incomplete")?;

    let store = wiring::blob_store(&settings)?;
    let submitter = wiring::submit_client(&settings, &wiring::speech_http(&settings)?)?;

    let server = Arc::new(ScribeServer::new(
        ServerConfig::from_settings(&settings),
        Arc::new(store),
        Arc::new(submitter),
    ));
    let addr = server.config().bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        bucket = %settings.storage.bucket,
        language = %settings.speech.recognition.language_code,
        "scribe ingest endpoint ready"
    );

    let shutdown = server.shutdown_token();
    let mut running = tokio::spawn({
        let server = server.clone();
        async move { server.serve(listener).await }
    });

    tokio::select! {
        result = &mut running => {
            return result.context("Server task panicked")?.context("Server failed");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl-c")?;
        }
    }

    tracing::info!("Shutting down...");
    shutdown.cancel();
    running
        .await
        .context("Server task panicked")?
        .context("Server failed")?;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn read_upload(path: &Path) -> Result<AudioUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let upload = AudioUpload::new(bytes, content_type_for_path(path));
    Ok(match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => upload.with_file_name(name),
        None => upload,
    })
}

async fn transcribe(settings: ScribeSettings, file: Option<&Path>) -> Result<ExitCode> {
    let Some(path) = file else {
        print_state(&ViewState::Idle {
            notice: Some(SELECT_FILE_NOTICE.to_string()),
        });
        return Ok(ExitCode::FAILURE);
    };
    settings
        .validate_for_client()
        .context("Client settings are incomplete")?;
    let audio = read_upload(path).await?;

    let upload_http = wiring::http_client(settings.client.upload_timeout())?;
    let ingest = HttpIngestClient::new(upload_http, settings.client.ingest_url());
    let status = wiring::status_client(&settings, &wiring::speech_http(&settings)?)?;
    let mut view = TranscribeView::new(
        Arc::new(ingest),
        Arc::new(status),
        settings.client.poll_interval(),
    );

    eprintln!(
        "Uploading {} ({} bytes, {})...",
        path.display(),
        audio.len(),
        audio.content_type
    );
    view.submit(Some(audio)).await;

    let mut rx = view.subscribe();
    loop {
        let state = rx.borrow_and_update().clone();
        print_state(&state);
        if !matches!(state, ViewState::Polling { .. }) {
            return Ok(if resolved(&state) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for ctrl-c")?;
                view.teardown().await;
                eprintln!("Cancelled; the job keeps running on the speech service.");
                return Ok(ExitCode::from(130));
            }
        }
    }
}

fn print_state(state: &ViewState) {
    let text = state.render();
    if text.is_empty() {
        return;
    }
    match state {
        ViewState::Resolved { .. } => println!("{text}"),
        _ => eprintln!("{text}"),
    }
}

fn resolved(state: &ViewState) -> bool {
    matches!(state, ViewState::Resolved { .. })
}
