//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ScribeSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::ScribeSettings;

/// Resolve the default settings file path (`~/.scribe/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".scribe").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ScribeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with process env overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ScribeSettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

/// Load settings from a path, reading overrides through `env`.
pub fn load_settings_with_env<F>(path: &Path, env: F) -> Result<ScribeSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(ScribeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ScribeSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// Objects merge per key, arrays and primitives are replaced, nulls in
/// `source` are skipped.
pub fn deep_merge(target: Value, source: Value) -> Value {
    let Value::Object(layer) = source else {
        return source;
    };
    let Value::Object(mut base) = target else {
        return Value::Object(layer);
    };
    for (key, value) in layer.into_iter().filter(|(_, v)| !v.is_null()) {
        let next = match base.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        let _ = base.insert(key, next);
    }
    Value::Object(base)
}

/// Apply environment overrides read through `env`.
///
/// Invalid numeric, boolean, or enum values are logged and ignored.
pub fn apply_env_overrides<F>(settings: &mut ScribeSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let string = |name: &str| env(name).filter(|v| !v.is_empty());

    // ── Storage ─────────────────────────────────────────────────────
    if let Some(v) = string("GOOGLE_APPLICATION_CREDENTIALS") {
        settings.storage.credentials_path = Some(v);
    }
    if let Some(v) = string("GOOGLE_CLOUD_BUCKET_NAME") {
        settings.storage.bucket = v;
    }

    // ── Speech ──────────────────────────────────────────────────────
    if let Some(v) = string("GOOGLE_API_KEY") {
        settings.speech.api_key = Some(v);
    }
    if let Some(v) = string("GOOGLE_PUBLIC_API_KEY").or_else(|| string("NEXT_PUBLIC_GOOGLE_API_KEY"))
    {
        settings.speech.client_api_key = Some(v);
    }
    if let Some(v) = string("SCRIBE_LANGUAGE_CODE") {
        settings.speech.recognition.language_code = v;
    }
    if let Some(v) = checked("SCRIBE_SAMPLE_RATE_HZ", string("SCRIBE_SAMPLE_RATE_HZ"), |s| {
        parse_in_range(s, 8_000_u32, 48_000)
    }) {
        settings.speech.recognition.sample_rate_hertz = v;
    }
    if let Some(v) = checked("SCRIBE_ENCODING", string("SCRIBE_ENCODING"), |s| {
        serde_json::from_value(Value::String(s.to_ascii_uppercase())).ok()
    }) {
        settings.speech.recognition.encoding = v;
    }

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = string("SCRIBE_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = checked("SCRIBE_PORT", string("SCRIBE_PORT"), |s| s.parse::<u16>().ok()) {
        settings.server.port = v;
    }
    if let Some(v) = checked("SCRIBE_MAX_UPLOAD_BYTES", string("SCRIBE_MAX_UPLOAD_BYTES"), |s| {
        parse_in_range(s, 1024_usize, 1_073_741_824)
    }) {
        settings.server.max_upload_bytes = v;
    }

    if let Some(v) = checked("SCRIBE_UPLOAD_TIMEOUT_MS", string("SCRIBE_UPLOAD_TIMEOUT_MS"), |s| {
        parse_in_range(s, 1_000_u64, 3_600_000)
    }) {
        settings.storage.upload_timeout_ms = v;
        settings.client.upload_timeout_ms = v;
    }

    // ── Client ──────────────────────────────────────────────────────
    if let Some(v) = string("SCRIBE_SERVER_URL") {
        settings.client.server_url = v;
    }
    if let Some(v) = checked("SCRIBE_POLL_INTERVAL_MS", string("SCRIBE_POLL_INTERVAL_MS"), |s| {
        parse_in_range(s, 100_u64, 600_000)
    }) {
        settings.client.poll_interval_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = string("SCRIBE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = checked("SCRIBE_LOG_JSON", string("SCRIBE_LOG_JSON"), parse_bool) {
        settings.logging.json = v;
    }
}

fn checked<T>(name: &str, raw: Option<String>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(key = name, value = %raw, "invalid env var, ignoring");
    }
    parsed
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a number and keep it only if it lies in `min..=max`.
pub fn parse_in_range<T>(val: &str, min: T, max: T) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    val.parse::<T>()
        .ok()
        .filter(|n| (min..=max).contains(n))
}
