//! Server configuration.

use scribe_core::RecognitionConfig;
use scribe_settings::ScribeSettings;
use serde::{Deserialize, Serialize};

/// Configuration for the ingest server.
///
/// The binary builds this with [`ServerConfig::from_settings`], which takes
/// `server.host` and `server.port` (default `0.0.0.0:3000`). The `Default`
/// impl binds `127.0.0.1` on an auto-assigned port and exists for tests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind (`0` auto-assigns).
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Recognition parameters sent with every job.
    pub recognition: RecognitionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_upload_bytes: 50 * 1024 * 1024, // 50 MiB
            recognition: RecognitionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Take the server-relevant parts of loaded settings.
    pub fn from_settings(settings: &ScribeSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            max_upload_bytes: settings.server.max_upload_bytes,
            recognition: settings.speech.recognition.clone(),
        }
    }

    /// `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
