//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → loader::build_settings → context Settings held by the engine
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → engine swaps its Settings atomically
//!     → contexts checked out afterwards render with the new settings
//! ```
//!
//! # Design Decisions
//! - Only response settings and the code catalog are hot-reloaded;
//!   listener, limits on the server side and observability need a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_settings, load_config, parse_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, ResponseConfig, ServerConfig,
    TimeoutConfig,
};
pub use watcher::ConfigWatcher;
