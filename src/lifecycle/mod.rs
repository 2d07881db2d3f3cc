//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Ctrl+C → root token cancelled
//!         → server stops accepting, drains in-flight requests
//!         → per-request execution contexts observe cancellation
//! ```
//!
//! # Design Decisions
//! - One root token; request contexts hold child tokens
//! - Dispatch never consults cancellation; handlers decide

pub mod shutdown;

pub use shutdown::Shutdown;
