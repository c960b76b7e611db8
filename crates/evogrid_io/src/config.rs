//! Loading and saving `AppConfig` as TOML.

use crate::error::{IoError, Result};
use evogrid_core::config::AppConfig;
use std::path::Path;
use tracing::{info, warn};

/// Reads and validates a config file. A missing file yields the defaults;
/// a malformed or invalid one is an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading config {}", path.display()))
    })?;
    let config = parse_config(&content)
        .map_err(|e| e.with_context(format!("loading config {}", path.display())))?;
    info!(path = %path.display(), fingerprint = %config.fingerprint(), "Config loaded");
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content).map_err(|e| IoError::config(e.to_string()))?;
    config
        .validate()
        .map_err(|e| IoError::validation(e.to_string()))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<()> {
    let text = toml::to_string_pretty(config).map_err(|e| IoError::config(e.to_string()))?;
    std::fs::write(path.as_ref(), text).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing config {}", path.as_ref().display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.fingerprint(), AppConfig::default().fingerprint());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[world\nsize = ").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err.root(), IoError::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[evolution]\nmutation_probability = 2.0\n").unwrap_err();
        assert!(matches!(err, IoError::Validation(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evogrid.toml");
        let mut config = AppConfig::default();
        config.world.size = 40;
        config.world.seed = Some(9);
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.world.size, 40);
        assert_eq!(loaded.world.seed, Some(9));
    }
}
