//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every ShutdownSignal resolves → background tasks exit
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
