//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span (tower-http)
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
