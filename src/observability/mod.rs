//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Builder, gateway, submitter and RPC client produce:
//!     → tracing events (structured fields: hash, attempts, method)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The library only emits; the binary decides whether to install a
//!   subscriber or exporter
//! - Metric updates without an installed recorder are no-ops

pub mod logging;
pub mod metrics;
