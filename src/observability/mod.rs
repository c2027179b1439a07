//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms, handler durations)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with request ID propagated by the HTTP layer
//! - Metric updates go through the `metrics` facade; no recorder means no-op
//! - Handler timings reach metrics through the `MetricsSink` seam

pub mod logging;
pub mod metrics;
