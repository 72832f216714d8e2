//! Session subsystem: auth state consuming the pipeline.
//!
//! # Data Flow
//! ```text
//! SessionStore::login / logout / load_profile
//!     → Pipeline::request
//!     → ApiResponse | ClassifiedError
//!     → state.rs (reduce) → watch channel → UI
//!
//! Pipeline hard auth failure
//!     → events.rs (SessionEvent::SessionExpired on the bus)
//!     → guard.rs (dispatch SessionExpired) → forced logout
//! ```

pub mod events;
pub mod guard;
pub mod state;
pub mod store;

pub use events::{SessionEvent, SessionEvents};
pub use guard::spawn_session_guard;
pub use state::{reduce, AuthAction, AuthState, AuthStatus, SessionNotice};
pub use store::{Credentials, SessionError, SessionStore};
