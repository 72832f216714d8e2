//! Auth state and its reducer.
//!
//! # States
//! - Idle: nothing known yet (before the startup profile check)
//! - Loading: a login or profile check is running
//! - Authenticated: a user is present
//! - Unauthenticated: logged out, login failed, or session expired
//!
//! # Design Decisions
//! - `reduce` is pure; stores apply it and publish the result
//! - Soft auth failures keep the user and only set `error`
//! - A forced logout (`SessionExpired`) is the only transition that raises
//!   the session-expired notice

use serde::Serialize;
use serde_json::Value;

/// Coarse authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Banner the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNotice {
    /// Redirect to login.
    SessionExpired,
    /// Transient connectivity banner.
    NetworkUnavailable,
}

/// Client-side auth state for one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<Value>,
    pub error: Option<String>,
    pub notice: Option<SessionNotice>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated && self.user.is_some()
    }

    /// Status once nothing is loading any more.
    fn settled_status(&self) -> AuthStatus {
        if self.user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }
}

/// Everything that can change auth state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    LoginStarted,
    LoginSucceeded(Value),
    LoginFailed(String),
    ProfileRequested,
    ProfileLoaded(Value),
    /// A non-auth failure while loading; keeps whatever user is present.
    RequestFailed(String),
    LoggedOut,
    /// Hard auth failure: the session is gone.
    SessionExpired,
    /// Soft auth failure: keep the session, surface the message.
    AuthWarning(String),
    NetworkUnavailable,
    NoticeDismissed,
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Compute the next state.
pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    let mut next = state.clone();
    match action {
        AuthAction::LoginStarted | AuthAction::ProfileRequested => {
            next.status = AuthStatus::Loading;
            next.error = None;
        }
        AuthAction::LoginSucceeded(user) | AuthAction::ProfileLoaded(user) => {
            next.status = AuthStatus::Authenticated;
            next.user = Some(user);
            next.error = None;
            next.notice = None;
        }
        AuthAction::LoginFailed(message) => {
            next.status = AuthStatus::Unauthenticated;
            next.user = None;
            next.error = Some(message);
        }
        AuthAction::RequestFailed(message) | AuthAction::AuthWarning(message) => {
            next.status = next.settled_status();
            next.error = Some(message);
        }
        AuthAction::LoggedOut => {
            next = AuthState {
                status: AuthStatus::Unauthenticated,
                ..AuthState::default()
            };
        }
        AuthAction::SessionExpired => {
            next.status = AuthStatus::Unauthenticated;
            next.user = None;
            next.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
            next.notice = Some(SessionNotice::SessionExpired);
        }
        AuthAction::NetworkUnavailable => {
            if next.status == AuthStatus::Loading {
                next.status = next.settled_status();
            }
            // A pending forced logout outranks the transient banner.
            if next.notice != Some(SessionNotice::SessionExpired) {
                next.notice = Some(SessionNotice::NetworkUnavailable);
            }
        }
        AuthAction::NoticeDismissed => {
            next.notice = None;
        }
    }
    next
}
