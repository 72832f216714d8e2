//! Actor routing subsystem.
//!
//! # Data Flow
//! ```text
//! ActorConfig (prefix + endpoint names)
//!     → actor.rs (resolve login/logout/refresh/profile paths)
//!     → matcher.rs (compile auth endpoint matchers)
//!     → AuthEndpoints (immutable, one per pipeline)
//! ```
//!
//! # Design Decisions
//! - Endpoints compiled at construction, immutable at runtime
//! - Matching happens on the resolved URL path only

pub mod actor;
pub mod matcher;

pub use actor::{Actor, AuthEndpoints};
