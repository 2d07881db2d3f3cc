//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section falls back to its defaults, so an empty file is valid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::context::{DEFAULT_LEGACY_SEPARATOR, DEFAULT_MAX_RESPONSE_BODY, DEFAULT_STATUS_CODE_HEADER};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, backpressure).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request and response size limits.
    pub limits: LimitsConfig,

    /// Response envelope settings.
    pub response: ResponseConfig,

    /// Client address resolution behind a proxy.
    pub proxy: ProxyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Business code messages, keyed by decimal code.
    pub codes: HashMap<String, String>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_connections: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body buffered before dispatch.
    pub max_request_body_bytes: usize,

    /// Largest response body a handler may write.
    pub max_response_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_body_bytes: 1024 * 1024,
            max_response_body_bytes: DEFAULT_MAX_RESPONSE_BODY,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Header carrying the business code on every envelope response.
    pub status_code_header: String,

    /// Separator of legacy `"code||message"` business messages.
    pub legacy_separator: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status_code_header: DEFAULT_STATUS_CODE_HEADER.to_string(),
            legacy_separator: DEFAULT_LEGACY_SEPARATOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Header set by a trusted edge proxy with the client address.
    ///
    /// When present on a request its value takes precedence over
    /// `X-Forwarded-For` and `X-Real-Ip`.
    pub trusted_ip_header: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
