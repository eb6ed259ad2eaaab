//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The settings file is not valid JSON.
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Merged values do not fit the settings schema.
    #[error("settings do not match the expected shape: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting the current command needs has no value.
    #[error("{key} is not set (set {env} or add it to the settings file)")]
    Missing {
        /// Dotted settings key.
        key: &'static str,
        /// Environment variable that supplies it.
        env: &'static str,
    },

    /// A setting is present but unusable.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl SettingsError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Parse { .. } | Self::Json(_) => "parse",
            Self::Missing { .. } => "missing",
            Self::InvalidValue(_) => "invalid",
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
