//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::StabilityConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<StabilityConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: StabilityConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let path = write_temp(
            "stability-valid.toml",
            "[retry]\nmax_retries = 7\ndelay_ms = 20\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.retry.max_retries, 7);
        assert_eq!(config.retry.delay_ms, 20);
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_invalid_config() {
        let path = write_temp(
            "stability-invalid.toml",
            "[debounce]\nwindow_ms = 0\npoll_interval_ms = 0\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 2));
        assert_eq!(
            err.to_string(),
            "Validation failed: debounce.window_ms: must be greater than 0, \
             debounce.poll_interval_ms: must be greater than 0"
        );
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_malformed_config() {
        let path = write_temp("stability-malformed.toml", "[retry\nmax_retries = ");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("stability-does-not-exist.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
