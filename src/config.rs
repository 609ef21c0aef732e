// src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{Result, TickerError};

pub const DEFAULT_FETCH_INTERVAL: f64 = 60.0;
pub const DEFAULT_ROTATION_INTERVAL: f64 = 15.0;

/// Longest period any timer may run with: one year.
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// What the host hands to the ticker. Any field may change while running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerConfig {
    #[serde(default, alias = "apikey")]
    pub access_key: String,
    #[serde(default, alias = "sheetId")]
    pub source_id: String,
    #[serde(default = "default_fetch_interval", alias = "fetchInterval")]
    pub fetch_interval_seconds: f64,
    #[serde(default = "default_rotation_interval", alias = "rollInterval")]
    pub rotation_interval_seconds: f64,
}

fn default_fetch_interval() -> f64 {
    DEFAULT_FETCH_INTERVAL
}

fn default_rotation_interval() -> f64 {
    DEFAULT_ROTATION_INTERVAL
}

impl Default for TickerConfig {
    fn default() -> Self {
        TickerConfig {
            access_key: String::new(),
            source_id: String::new(),
            fetch_interval_seconds: DEFAULT_FETCH_INTERVAL,
            rotation_interval_seconds: DEFAULT_ROTATION_INTERVAL,
        }
    }
}

impl TickerConfig {
    pub fn new(access_key: impl Into<String>, source_id: impl Into<String>) -> Self {
        TickerConfig {
            access_key: access_key.into(),
            source_id: source_id.into(),
            ..TickerConfig::default()
        }
    }

    /// Reads a config file without checking the values, so that command
    /// line overrides can still fix them before `validate`.
    pub fn parse_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = TickerConfig::parse_from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Both the source and the credential are needed before anything is fetched.
    pub fn has_source(&self) -> bool {
        !self.access_key.trim().is_empty() && !self.source_id.trim().is_empty()
    }

    /// True when switching to `other` means talking to a different sheet.
    pub fn source_differs(&self, other: &TickerConfig) -> bool {
        self.source_id != other.source_id || self.access_key != other.access_key
    }

    pub fn fetch_every(&self) -> Duration {
        seconds(self.fetch_interval_seconds, DEFAULT_FETCH_INTERVAL)
    }

    pub fn rotate_every(&self) -> Duration {
        seconds(self.rotation_interval_seconds, DEFAULT_ROTATION_INTERVAL)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("fetchIntervalSeconds", self.fetch_interval_seconds),
            ("rotationIntervalSeconds", self.rotation_interval_seconds),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TickerError::Config(format!(
                    "{name} must be a positive number of seconds, got {value}"
                )));
            }
            if value > MAX_INTERVAL.as_secs_f64() {
                return Err(TickerError::Config(format!(
                    "{name} must be at most {} seconds, got {value}",
                    MAX_INTERVAL.as_secs()
                )));
            }
        }
        Ok(())
    }
}

// Unvalidated configs fall back to the default period rather than
// producing a zero-length timer, and are capped at MAX_INTERVAL.
fn seconds(value: f64, fallback: f64) -> Duration {
    if value.is_finite() && value > MAX_INTERVAL.as_secs_f64() {
        return MAX_INTERVAL;
    }
    Duration::try_from_secs_f64(value)
        .ok()
        .filter(|duration| !duration.is_zero())
        .unwrap_or_else(|| Duration::from_secs_f64(fallback))
}

/// Reloads a config file when its modification time moves forward.
pub struct ConfigWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        ConfigWatcher {
            path,
            last_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the freshly parsed config if the file changed since the
    /// last poll, `Ok(None)` if it did not. Values are not validated here.
    pub fn poll(&mut self) -> Result<Option<TickerConfig>> {
        let current = match modified(&self.path) {
            Some(current) => current,
            None => return Ok(None),
        };

        if let Some(last) = self.last_modified {
            if current <= last {
                return Ok(None);
            }
        }

        self.last_modified = Some(current);
        TickerConfig::parse_from_path(&self.path).map(Some)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_intervals_use_defaults() {
        let config: TickerConfig =
            serde_json::from_str(r#"{"accessKey": "k", "sourceId": "s"}"#).unwrap();

        assert_eq!(config.fetch_every(), Duration::from_secs(60));
        assert_eq!(config.rotate_every(), Duration::from_secs(15));
        assert!(config.has_source());
    }

    #[test]
    fn legacy_names_are_accepted() {
        let config: TickerConfig = serde_json::from_str(
            r#"{"apikey": "k", "sheetId": "s", "fetchInterval": 30, "rollInterval": 2.5}"#,
        )
        .unwrap();

        assert_eq!(config.access_key, "k");
        assert_eq!(config.source_id, "s");
        assert_eq!(config.fetch_every(), Duration::from_secs(30));
        assert_eq!(config.rotate_every(), Duration::from_millis(2500));
    }

    #[test]
    fn blank_credentials_have_no_source() {
        assert!(!TickerConfig::new("", "sheet").has_source());
        assert!(!TickerConfig::new("key", "  ").has_source());
        assert!(TickerConfig::new("key", "sheet").has_source());
    }

    #[test]
    fn source_differs_ignores_intervals() {
        let base = TickerConfig::new("key", "sheet");
        let slower = TickerConfig {
            rotation_interval_seconds: 5.0,
            fetch_interval_seconds: 120.0,
            ..base.clone()
        };

        assert!(!base.source_differs(&slower));
        assert!(base.source_differs(&TickerConfig::new("other", "sheet")));
        assert!(base.source_differs(&TickerConfig::new("key", "other")));
    }

    #[test]
    fn validate_rejects_non_positive_intervals() {
        let mut config = TickerConfig::new("key", "sheet");
        assert!(config.validate().is_ok());

        config.rotation_interval_seconds = 0.0;
        assert!(matches!(config.validate(), Err(TickerError::Config(_))));

        config.rotation_interval_seconds = 1.0;
        config.fetch_interval_seconds = f64::NAN;
        assert!(matches!(config.validate(), Err(TickerError::Config(_))));
    }

    #[test]
    fn validate_rejects_intervals_beyond_a_year() {
        let config = TickerConfig {
            fetch_interval_seconds: 1e19,
            ..TickerConfig::new("key", "sheet")
        };
        assert!(matches!(config.validate(), Err(TickerError::Config(_))));

        let config = TickerConfig {
            rotation_interval_seconds: MAX_INTERVAL.as_secs_f64(),
            ..TickerConfig::new("key", "sheet")
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn huge_interval_is_capped_when_unvalidated() {
        let config = TickerConfig {
            fetch_interval_seconds: 1e19,
            rotation_interval_seconds: 1e300,
            ..TickerConfig::default()
        };

        assert_eq!(config.fetch_every(), MAX_INTERVAL);
        assert_eq!(config.rotate_every(), MAX_INTERVAL);
    }

    #[test]
    fn invalid_interval_falls_back_when_unvalidated() {
        let config = TickerConfig {
            fetch_interval_seconds: -3.0,
            rotation_interval_seconds: 0.0,
            ..TickerConfig::default()
        };

        assert_eq!(config.fetch_every(), Duration::from_secs(60));
        assert_eq!(config.rotate_every(), Duration::from_secs(15));
    }
}
