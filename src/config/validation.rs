//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0) and formats (URLs, header names)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use hyper::header::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base_url `{0}` is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("header `{0}` has an invalid name or value")]
    InvalidHeader(String),

    #[error("timeouts.request_ms must be greater than zero")]
    ZeroTimeout,

    #[error("request_id.header `{0}` is not a valid header name")]
    InvalidRequestIdHeader(String),

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base_url) = &config.base_url {
        let valid = Url::parse(base_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
        }
    }

    for (name, value) in &config.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeader(name.clone()));
        }
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.request_id.enabled && HeaderName::from_bytes(config.request_id.header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidRequestIdHeader(config.request_id.header.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
