use std::path::Path;

use dlv_lib::{Config, DlvError};

/// Load config from a TOML file or fall back to defaults, then validate.
pub fn load_config(path: Option<&Path>) -> Result<Config, DlvError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string());
        DlvError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Merge CLI flags over the config file; a flag that was given wins.
pub fn resolve_settings(
    cli_threshold: Option<f64>,
    cli_time_threshold_ms: Option<u64>,
    cli_event_marker: Option<String>,
    config: &Config,
) -> Result<Config, DlvError> {
    let resolved = Config {
        match_threshold: cli_threshold.unwrap_or(config.match_threshold),
        warning_time_threshold_ms: cli_time_threshold_ms
            .unwrap_or(config.warning_time_threshold_ms),
        event_marker: cli_event_marker.unwrap_or_else(|| config.event_marker.clone()),
    };
    resolved.validate()?;
    Ok(resolved)
}

/// Log the effective config to stderr (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, config: &Config) {
    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    eprintln!(
        "Effective config [{source}]: threshold={:.2}, time-threshold={}ms, event-marker={}",
        config.match_threshold, config.warning_time_threshold_ms, config.event_marker
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_settings_prefers_cli_flags() {
        let file = Config {
            match_threshold: 0.5,
            warning_time_threshold_ms: 100,
            event_marker: "fileEvent".to_string(),
        };

        let resolved =
            resolve_settings(Some(0.9), None, Some("cliEvent".to_string()), &file).expect("valid");

        assert!((resolved.match_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(resolved.warning_time_threshold_ms, 100);
        assert_eq!(resolved.event_marker, "cliEvent");
    }

    #[test]
    fn resolve_settings_falls_back_to_config() {
        let file = Config {
            match_threshold: 0.5,
            warning_time_threshold_ms: 100,
            event_marker: "fileEvent".to_string(),
        };

        let resolved = resolve_settings(None, None, None, &file).expect("valid");
        assert!((resolved.match_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(resolved.event_marker, "fileEvent");
    }

    #[test]
    fn resolve_settings_rejects_bad_cli_threshold() {
        let err = resolve_settings(Some(2.0), None, None, &Config::default()).unwrap_err();
        assert!(format!("{err}").contains("match_threshold"));
    }
}
