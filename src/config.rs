use std::path::Path;

use serde::Deserialize;

use crate::error::{DlvError, Result};

/// Default marker value for relevant analytics events.
pub const DEFAULT_EVENT_MARKER: &str = "GAEvent";

/// Minimum score for a captured event to count as an instance of a reference.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

/// Events closer together than this get a rapid-fire warning.
pub const DEFAULT_WARNING_TIME_THRESHOLD_MS: u64 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub match_threshold: f64,
    pub warning_time_threshold_ms: u64,
    pub event_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            warning_time_threshold_ms: DEFAULT_WARNING_TIME_THRESHOLD_MS,
            event_marker: DEFAULT_EVENT_MARKER.to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&data)
            .map_err(|e| DlvError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(DlvError::Config(format!(
                "match_threshold must be between 0.0 and 1.0, got {}",
                self.match_threshold
            )));
        }
        if self.event_marker.trim().is_empty() {
            return Err(DlvError::Config(
                "event_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert!((cfg.match_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(cfg.warning_time_threshold_ms, 500);
        assert_eq!(cfg.event_marker, "GAEvent");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str("match_threshold = 0.8").expect("parse");
        assert!((cfg.match_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(cfg.warning_time_threshold_ms, 500);
        assert_eq!(cfg.event_marker, "GAEvent");
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let cfg = Config {
            match_threshold: 1.5,
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err}").contains("match_threshold"));
    }

    #[test]
    fn validate_rejects_empty_marker() {
        let cfg = Config {
            event_marker: "  ".to_string(),
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err}").contains("event_marker"));
    }
}
