//! Per-request context and middleware chain for HTTP services.

pub mod binding;
pub mod config;
pub mod context;
pub mod ecode;
pub mod engine;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;

pub use config::ServerConfig;
pub use context::{handler, Context, HandlerFunc};
pub use engine::Engine;
pub use error::Error;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
