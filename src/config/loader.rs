//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

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

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let config = parse_config(&content)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config = parse_config(
            r#"
            base_url = "http://api.local:8080/v1"

            [headers]
            x-service = "billing"

            [timeouts]
            request_ms = 1500

            [request_id]
            enabled = true

            [cookies]
            jar = true
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://api.local:8080/v1"));
        assert_eq!(config.headers.get("x-service").map(String::as_str), Some("billing"));
        assert_eq!(config.timeouts.request_ms, 1500);
        assert!(config.request_id.enabled);
        assert_eq!(config.request_id.header, "x-request-id");
        assert!(config.cookies.jar);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.base_url.is_none());
        assert_eq!(config.timeouts.request_ms, 30_000);
    }

    #[test]
    fn syntax_and_semantic_errors_are_distinct() {
        assert!(matches!(parse_config("base_url = "), Err(ConfigError::Parse(_))));
        let err = parse_config("[timeouts]\nrequest_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("request_ms must be greater than zero"));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("layered-client-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "base_url = \"http://localhost:9000\"").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));

        fs::remove_file(&path).unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Io { .. })));
    }
}
