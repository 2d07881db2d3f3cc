//! Configuration loading from disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderName;

use crate::binding::DefaultTranslator;
use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::context::Settings;
use crate::ecode::CatalogResolver;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
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
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the context rendering settings described by `config`.
pub fn build_settings(config: &ServerConfig) -> Result<Settings, ConfigError> {
    let mut errors = Vec::new();

    let status_code_header = HeaderName::try_from(config.response.status_code_header.as_str())
        .map_err(|e| {
            errors.push(ValidationError {
                field: "response.status_code_header".into(),
                message: e.to_string(),
            })
        })
        .ok();

    let mut messages = HashMap::with_capacity(config.codes.len());
    for (key, message) in &config.codes {
        match key.trim().parse::<i32>() {
            Ok(code) => {
                messages.insert(code, message.clone());
            }
            Err(e) => errors.push(ValidationError {
                field: format!("codes.{key}"),
                message: e.to_string(),
            }),
        }
    }

    match status_code_header {
        Some(status_code_header) if errors.is_empty() => Ok(Settings {
            resolver: Arc::new(CatalogResolver::new(messages)),
            translator: Arc::new(DefaultTranslator),
            status_code_header,
            legacy_separator: config.response.legacy_separator.clone(),
            max_response_body_bytes: config.limits.max_response_body_bytes,
        }),
        _ => Err(ConfigError::Validation(errors)),
    }
}
