//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable consulted when `predictor.api_key` is empty.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

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
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let mut config: GatewayConfig = toml::from_str(content)?;
    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Fill secrets that are kept out of config files.
pub fn apply_env(config: &mut GatewayConfig) {
    if config.predictor.api_key.is_empty() {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.predictor.api_key = key.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error() {
        let err = parse_config("refresh = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config(
            r#"
            [refresh]
            interval_secs = 0
            fetch_timeout_secs = 0
            "#,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("refresh.interval_secs"));
        assert!(message.contains("refresh.fetch_timeout_secs"));
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let config = parse_config(include_str!("../../gateway.example.toml")).unwrap();
        let defaults = GatewayConfig::default();
        assert_eq!(config.refresh.symbols, defaults.refresh.symbols);
        assert_eq!(config.rate_limit.predict.limit, 10);
        assert_eq!(config.upstream.news_symbol, "^NSEI");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
