//! Builds the external clients from loaded settings.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scribe_cloud::{GcsBlobStore, ServiceAccountTokenSource, SpeechClient};
use scribe_settings::ScribeSettings;

/// HTTP client whose requests give up after `timeout`.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Client for speech job creation and status calls.
pub fn speech_http(settings: &ScribeSettings) -> Result<reqwest::Client> {
    http_client(settings.speech.timeout())
}

/// Cloud Storage store authenticated by the configured service account.
///
/// Object writes and token exchanges share a client bounded by
/// `storage.uploadTimeoutMs`.
pub fn blob_store(settings: &ScribeSettings) -> Result<GcsBlobStore> {
    let http = http_client(settings.storage.upload_timeout())?;
    let credentials = settings
        .storage
        .credentials_path
        .as_deref()
        .context("storage.credentialsPath is not set")?;
    let tokens = ServiceAccountTokenSource::from_file(Path::new(credentials), http.clone())
        .with_context(|| format!("Failed to load service-account key from {credentials}"))?;
    Ok(GcsBlobStore::new(
        http,
        settings.storage.base_url.as_str(),
        settings.storage.bucket.as_str(),
        Arc::new(tokens),
    ))
}

/// Speech client for job creation, using the server key.
pub fn submit_client(settings: &ScribeSettings, http: &reqwest::Client) -> Result<SpeechClient> {
    let key = settings
        .speech
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .context("speech.apiKey is not set")?;
    Ok(SpeechClient::new(
        http.clone(),
        settings.speech.base_url.as_str(),
        key,
    ))
}

/// Speech client for status polling, using the client key.
pub fn status_client(settings: &ScribeSettings, http: &reqwest::Client) -> Result<SpeechClient> {
    let key = settings
        .speech
        .polling_key()
        .context("no API key configured for status polling")?;
    Ok(SpeechClient::new(
        http.clone(),
        settings.speech.base_url.as_str(),
        key,
    ))
}
