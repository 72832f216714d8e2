//! Resilient authenticated request pipeline.
//!
//! # Data Flow
//! ```text
//! pipeline.request(config)
//!     → client.rs (resolve URL, stamp start time, offline check)
//!     → Transport::send
//!     → classify.rs (network / auth endpoint / token problem / hard code / other)
//!     → refresh.rs (single flight; waiters queue behind the leader)
//!     → resubmit or reject with ClassifiedError (error.rs)
//! ```
//!
//! # Design Decisions
//! - One instance per actor, each with its own refresh state
//! - Callers only ever see `ApiResponse` or a `ClassifiedError`
//! - At most one refresh and one resubmission per request

pub mod classify;
pub mod client;
pub mod error;
pub mod refresh;

pub use client::Pipeline;
pub use error::{ClassifiedError, ErrorCode, ErrorKind, FailureClass};
pub use refresh::RefreshOutcome;
