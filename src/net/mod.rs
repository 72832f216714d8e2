//! Network environment subsystem.
//!
//! # Data Flow
//! ```text
//! Runtime online/offline signal
//!     → connectivity.rs (atomic flag, transition logging)
//!     → pipeline outbound interception (fail fast while offline)
//! ```

pub mod connectivity;

pub use connectivity::Connectivity;
