//! # scribe-settings
//!
//! Configuration with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ScribeSettings::default()`]
//! 2. **Settings file**: `~/.scribe/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `GOOGLE_*` credentials and `SCRIBE_*`
//!    overrides (highest priority)
//!
//! Settings are loaded once at startup and passed down explicitly; there is
//! no global instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path,
    load_settings_with_env, settings_path,
};
pub use types::{
    ClientSettings, LoggingSettings, ScribeSettings, ServerSettings, SpeechSettings,
    StorageSettings,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_dot_scribe() {
        let path = settings_path();
        assert!(path.ends_with(".scribe/settings.json"));
    }
}
