use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::warn;

use crate::infra::DEFAULT_QUOTE_TTL;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "BlockCourier";
const APP_NAME: &str = "DeliveryQuote";

/// Overrides `cache_ttl_secs` when set to a whole number of seconds.
pub const CACHE_TTL_ENV: &str = "DELIVERY_QUOTE_CACHE_TTL";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_QUOTE_TTL.as_secs()
}

fn default_log_filter() -> String {
    "warn,delivery_quote=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Stored settings (or defaults), then environment overrides.
    pub fn resolve() -> Self {
        let mut settings = match settings_file() {
            Some(path) => match load_settings_from(&path) {
                Ok(Some(settings)) => settings,
                Ok(None) => Settings::default(),
                Err(err) => {
                    warn!(path = %path.display(), "Ignoring unreadable settings: {err}");
                    Settings::default()
                }
            },
            None => Settings::default(),
        };
        settings.apply_env(std::env::var(CACHE_TTL_ENV).ok().as_deref());
        settings
    }

    fn apply_env(&mut self, ttl: Option<&str>) {
        let Some(raw) = ttl else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(secs) => self.cache_ttl_secs = secs,
            Err(_) => warn!("{CACHE_TTL_ENV}={raw} is not a number of seconds; keeping {}", self.cache_ttl_secs),
        }
    }
}

pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

/// `Ok(None)` when the file does not exist.
pub fn load_settings_from(path: &Path) -> Result<Option<Settings>, SettingsError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf, SettingsError> {
    let path = settings_file().ok_or(SettingsError::StorageUnavailable)?;
    save_settings_to(&path, settings)?;
    Ok(path)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("delivery-quote-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = scratch_file("missing.json");
        assert!(load_settings_from(&path).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let path = scratch_file("roundtrip.json");
        let settings = Settings {
            cache_ttl_secs: 60,
            log_filter: "debug".to_string(),
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), Some(settings));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let path = scratch_file("partial.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"cache_ttl_secs": 30}"#).unwrap();
        let loaded = load_settings_from(&path).unwrap().unwrap();
        assert_eq!(loaded.cache_ttl(), Duration::from_secs(30));
        assert_eq!(loaded.log_filter, default_log_filter());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = scratch_file("broken.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings_from(&path), Err(SettingsError::Serde(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn env_override() {
        let mut settings = Settings::default();
        settings.apply_env(Some("90"));
        assert_eq!(settings.cache_ttl_secs, 90);
        settings.apply_env(Some("soon"));
        assert_eq!(settings.cache_ttl_secs, 90);
        settings.apply_env(None);
        assert_eq!(settings.cache_ttl_secs, 90);
    }

    #[test]
    fn defaults_match_quote_window() {
        assert_eq!(Settings::default().cache_ttl(), DEFAULT_QUOTE_TTL);
    }
}
