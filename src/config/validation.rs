//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts and limits > 0, addresses parse)
//! - Check header names and business code keys
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.limits.max_request_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_request_body_bytes", "must be greater than 0"));
    }
    if config.limits.max_response_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_response_body_bytes", "must be greater than 0"));
    }

    if HeaderName::try_from(config.response.status_code_header.as_str()).is_err() {
        errors.push(ValidationError::new(
            "response.status_code_header",
            format!("{:?} is not a valid header name", config.response.status_code_header),
        ));
    }
    if config.response.legacy_separator.is_empty() {
        errors.push(ValidationError::new("response.legacy_separator", "must not be empty"));
    }

    if let Some(header) = &config.proxy.trusted_ip_header {
        if HeaderName::try_from(header.as_str()).is_err() {
            errors.push(ValidationError::new(
                "proxy.trusted_ip_header",
                format!("{header:?} is not a valid header name"),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    let mut keys: Vec<&String> = config.codes.keys().collect();
    keys.sort();
    for key in keys {
        if key.trim().parse::<i32>().is_err() {
            errors.push(ValidationError::new(
                format!("codes.{key}"),
                "key must be a decimal business code",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
