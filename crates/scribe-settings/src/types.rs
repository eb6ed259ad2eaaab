//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a settings
//! file may specify any subset of fields.

use std::fmt;
use std::time::Duration;

use scribe_core::RecognitionConfig;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Default for `storage.uploadTimeoutMs` and `client.uploadTimeoutMs`.
const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 300_000;

/// Root settings type.
///
/// ```json
/// {
///   "storage": { "bucket": "my-audio" },
///   "speech": { "recognition": { "languageCode": "de-DE" } }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScribeSettings {
    /// Ingest endpoint network settings.
    pub server: ServerSettings,
    /// Blob store settings.
    pub storage: StorageSettings,
    /// Speech API settings.
    pub speech: SpeechSettings,
    /// Poll-driven client settings.
    pub client: ClientSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Ingest endpoint network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` auto-assigns).
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Blob store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Target bucket.
    pub bucket: String,
    /// Path to a service-account key file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,
    /// Storage API origin.
    pub base_url: String,
    /// Timeout for one object write, token exchange included, in milliseconds.
    pub upload_timeout_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            credentials_path: None,
            base_url: "https://storage.googleapis.com".to_string(),
            upload_timeout_ms: DEFAULT_UPLOAD_TIMEOUT_MS,
        }
    }
}

impl StorageSettings {
    /// Timeout for one object write.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }
}

/// Speech API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechSettings {
    /// Speech API origin.
    pub base_url: String,
    /// Server-side key used to create jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Key handed to clients for polling job status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_api_key: Option<String>,
    /// Timeout for job creation and status calls, in milliseconds.
    pub timeout_ms: u64,
    /// Recognition parameters sent with every job.
    pub recognition: RecognitionConfig,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            base_url: "https://speech.googleapis.com".to_string(),
            api_key: None,
            client_api_key: None,
            timeout_ms: 30_000,
            recognition: RecognitionConfig::default(),
        }
    }
}

impl fmt::Debug for SpeechSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field(
                "client_api_key",
                &self.client_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("timeout_ms", &self.timeout_ms)
            .field("recognition", &self.recognition)
            .finish()
    }
}

impl SpeechSettings {
    /// Key used for status polling: the client key, else the server key.
    pub fn polling_key(&self) -> Option<&str> {
        self.client_api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Timeout for job creation and status calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Poll-driven client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Origin of the ingest endpoint.
    pub server_url: String,
    /// Delay between status polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Timeout for posting audio to the ingest endpoint, in milliseconds.
    pub upload_timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            poll_interval_ms: 5_000,
            upload_timeout_ms: DEFAULT_UPLOAD_TIMEOUT_MS,
        }
    }
}

impl ClientSettings {
    /// Delay between status polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Timeout for posting audio to the ingest endpoint.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    /// Full URL of the ingest endpoint.
    pub fn ingest_url(&self) -> String {
        format!(
            "{}/api/speech-to-text",
            self.server_url.trim_end_matches('/')
        )
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON records instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ScribeSettings {
    /// Check everything the ingest endpoint needs.
    pub fn validate_for_server(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(SettingsError::Missing {
                key: "storage.bucket",
                env: "GOOGLE_CLOUD_BUCKET_NAME",
            });
        }
        if self
            .storage
            .credentials_path
            .as_deref()
            .is_none_or(str::is_empty)
        {
            return Err(SettingsError::Missing {
                key: "storage.credentialsPath",
                env: "GOOGLE_APPLICATION_CREDENTIALS",
            });
        }
        if self.speech.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(SettingsError::Missing {
                key: "speech.apiKey",
                env: "GOOGLE_API_KEY",
            });
        }
        if self.server.max_upload_bytes == 0 {
            return Err(SettingsError::InvalidValue(
                "server.maxUploadBytes must be positive".into(),
            ));
        }
        if self.storage.upload_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "storage.uploadTimeoutMs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Check everything the poll-driven client needs.
    pub fn validate_for_client(&self) -> Result<()> {
        if self.speech.polling_key().is_none() {
            return Err(SettingsError::Missing {
                key: "speech.clientApiKey",
                env: "GOOGLE_PUBLIC_API_KEY",
            });
        }
        if self.client.poll_interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "client.pollIntervalMs must be positive".into(),
            ));
        }
        if self.client.upload_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "client.uploadTimeoutMs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use scribe_core::AudioEncoding;

    fn server_ready() -> ScribeSettings {
        let mut s = ScribeSettings::default();
        s.storage.bucket = "audio".into();
        s.storage.credentials_path = Some("/etc/key.json".into());
        s.speech.api_key = Some("server-key".into());
        s
    }

    #[test]
    fn defaults() {
        let s = ScribeSettings::default();
        assert_eq!(s.server.port, 3000);
        assert_eq!(s.server.max_upload_bytes, 52_428_800);
        assert_eq!(s.client.poll_interval(), Duration::from_secs(5));
        assert_eq!(s.speech.recognition.encoding, AudioEncoding::Mp3);
        assert_eq!(s.speech.recognition.sample_rate_hertz, 16_000);
        assert_eq!(s.speech.recognition.language_code, "en-US");
        assert_eq!(s.logging.level, "info");
    }

    #[test]
    fn camel_case_wire_format() {
        let value = serde_json::to_value(ScribeSettings::default()).unwrap();
        assert_eq!(value["server"]["maxUploadBytes"], 52_428_800);
        assert_eq!(value["client"]["pollIntervalMs"], 5000);
        assert_eq!(value["speech"]["recognition"]["sampleRateHertz"], 16000);
        assert!(value["speech"].get("apiKey").is_none());
    }

    #[test]
    fn ingest_url_trims_trailing_slash() {
        let client = ClientSettings {
            server_url: "http://localhost:3000/".into(),
            ..ClientSettings::default()
        };
        assert_eq!(client.ingest_url(), "http://localhost:3000/api/speech-to-text");
    }

    #[test]
    fn polling_key_prefers_client_key() {
        let mut speech = SpeechSettings::default();
        assert_eq!(speech.polling_key(), None);
        speech.api_key = Some("server".into());
        assert_eq!(speech.polling_key(), Some("server"));
        speech.client_api_key = Some("public".into());
        assert_eq!(speech.polling_key(), Some("public"));
    }

    #[test]
    fn debug_redacts_keys() {
        let mut speech = SpeechSettings::default();
        speech.api_key = Some("AIza-secret".into());
        let printed = format!("{speech:?}");
        assert!(!printed.contains("AIza-secret"));
        assert!(printed.contains("[redacted]"));
    }

    #[test]
    fn server_validation() {
        assert!(server_ready().validate_for_server().is_ok());

        let mut s = server_ready();
        s.storage.bucket = " ".into();
        assert_matches!(s.validate_for_server(), Err(SettingsError::Missing { key: "storage.bucket", .. }));

        let mut s = server_ready();
        s.storage.credentials_path = None;
        assert_matches!(s.validate_for_server(), Err(SettingsError::Missing { key: "storage.credentialsPath", .. }));

        let mut s = server_ready();
        s.speech.api_key = Some(String::new());
        assert_matches!(s.validate_for_server(), Err(SettingsError::Missing { key: "speech.apiKey", .. }));
    }

    #[test]
    fn client_validation() {
        let mut s = ScribeSettings::default();
        assert_matches!(
            s.validate_for_client(),
            Err(SettingsError::Missing { env: "GOOGLE_PUBLIC_API_KEY", .. })
        );
        s.speech.client_api_key = Some("public".into());
        assert!(s.validate_for_client().is_ok());
        s.client.poll_interval_ms = 0;
        assert_matches!(s.validate_for_client(), Err(SettingsError::InvalidValue(_)));
    }

    #[test]
    fn uploads_outlast_speech_calls() {
        let s = ScribeSettings::default();
        assert_eq!(s.storage.upload_timeout(), Duration::from_secs(300));
        assert_eq!(s.client.upload_timeout(), Duration::from_secs(300));
        assert!(s.client.upload_timeout() > s.speech.timeout());

        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["storage"]["uploadTimeoutMs"], 300_000);
        assert_eq!(value["client"]["uploadTimeoutMs"], 300_000);
    }

    #[test]
    fn zero_upload_timeout_is_rejected() {
        let mut s = server_ready();
        s.storage.upload_timeout_ms = 0;
        assert_matches!(
            s.validate_for_server(),
            Err(SettingsError::InvalidValue(m)) if m.contains("storage.uploadTimeoutMs")
        );

        let mut s = ScribeSettings::default();
        s.speech.client_api_key = Some("public".into());
        s.client.upload_timeout_ms = 0;
        assert_matches!(
            s.validate_for_client(),
            Err(SettingsError::InvalidValue(m)) if m.contains("client.uploadTimeoutMs")
        );
    }
}
