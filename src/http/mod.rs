//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body buffering)
//!     → Engine::serve (context dispatch)
//!         → request.rs (form values, client IP metadata)
//!         → writer.rs (status once, buffered body)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod writer;

pub use request::RemoteIp;
pub use server::HttpServer;
pub use writer::ResponseWriter;
