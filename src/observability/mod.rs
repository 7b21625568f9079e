//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span (see `http::request`)
//! - Metrics are optional and off by default

pub mod logging;
pub mod metrics;
