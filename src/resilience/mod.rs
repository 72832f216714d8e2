//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request without a response:
//!     → backoff.rs (1s, 2s, 4s ... capped, optional jitter)
//!     → resubmit until the retry bound is reached
//!     → notice.rs (one "network unavailable" notice per cooldown window)
//! ```
//!
//! # Design Decisions
//! - Only missing responses are retried; any HTTP status is final here
//! - Delays are deterministic unless jitter is configured

pub mod backoff;
pub mod notice;

pub use backoff::calculate_backoff;
pub use notice::NoticeThrottle;
