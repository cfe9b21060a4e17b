//! Client settings persistence.
//!
//! Stores settings in the platform-specific config directory:
//! - Linux/macOS: ~/.config/graphit/settings.json
//! - Windows: %APPDATA%/graphit/settings.json
//!
//! `GRAPHIT_*` environment variables override stored values on load.

use std::path::{Path, PathBuf};

use graphit_domain::ClientSettings;
use tokio::fs;
use tracing::{debug, warn};

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable};

/// Overrides `ClientSettings::proxy_url`.
pub const PROXY_URL_VAR: &str = "GRAPHIT_PROXY_URL";
/// Overrides `ClientSettings::request_timeout_ms`.
pub const REQUEST_TIMEOUT_VAR: &str = "GRAPHIT_REQUEST_TIMEOUT_MS";
/// Overrides `ClientSettings::script_timeout_ms`.
pub const SCRIPT_TIMEOUT_VAR: &str = "GRAPHIT_SCRIPT_TIMEOUT_MS";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for client settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl SettingsRepository {
    /// Creates a repository for the default settings file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Creates a repository for an explicit settings file.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the default settings file path, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("graphit").join("settings.json"))
    }

    /// Returns the path this repository reads and writes.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings, falling back to defaults when the file is missing,
    /// then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let stored = match &self.path {
            Some(path) => fs::try_exists(path).await?.then_some(path),
            None => None,
        };

        let mut settings = match stored {
            Some(path) => {
                debug!(path = %path.display(), "Loading settings");
                let content = fs::read(path).await?;
                from_json_bytes(&content)?
            }
            None => ClientSettings::default(),
        };

        apply_overrides(&mut settings, |name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Saves settings as stable JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is known or the file cannot be written.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = to_json_stable(settings)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

/// Applies `GRAPHIT_*` overrides read through `lookup`.
///
/// Unparsable numbers are ignored with a warning.
pub fn apply_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(PROXY_URL_VAR).filter(|v| !v.trim().is_empty()) {
        settings.proxy_url = url;
    }
    if let Some(ms) = parse_ms(&lookup, REQUEST_TIMEOUT_VAR) {
        settings.request_timeout_ms = ms;
    }
    if let Some(ms) = parse_ms(&lookup, SCRIPT_TIMEOUT_VAR) {
        settings.script_timeout_ms = ms;
    }
}

fn parse_ms(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid override");
            None
        }
    }
}
