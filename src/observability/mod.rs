//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipelines and session stores produce:
//!     → logging.rs (structured log events: actor, request_id, path, attempt)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a call, across retries
//! - Metrics are cheap and exporter-agnostic

pub mod logging;
pub mod metrics;
