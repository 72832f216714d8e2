//! Auth state store bound to one actor's pipeline.
//!
//! # Responsibilities
//! - Hold the actor's `AuthState` and publish changes through a watch channel
//! - Run the async auth flows (login, logout, profile check) over the pipeline
//! - Translate classified failures into state actions
//!
//! # Design Decisions
//! - Logout always clears local state, even when the server call fails
//! - Hard auth failures dispatch `SessionExpired` here as well as through
//!   the guard; the reducer makes the second dispatch a no-op

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::http::{ApiResponse, RequestConfig, Transport};
use crate::pipeline::{ClassifiedError, FailureClass, Pipeline};
use crate::routing::Actor;
use crate::session::state::{reduce, AuthAction, AuthState};

/// Errors returned by the auth flows.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Request(#[from] ClassifiedError),

    #[error("unexpected response payload: {0}")]
    InvalidPayload(String),
}

/// Login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Auth state for one actor.
pub struct SessionStore<T: Transport> {
    pipeline: Arc<Pipeline<T>>,
    state: watch::Sender<AuthState>,
}

impl<T: Transport> SessionStore<T> {
    pub fn new(pipeline: Arc<Pipeline<T>>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { pipeline, state }
    }

    pub fn actor(&self) -> Actor {
        self.pipeline.actor()
    }

    pub fn pipeline(&self) -> &Arc<Pipeline<T>> {
        &self.pipeline
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: AuthAction) {
        tracing::debug!(actor = %self.actor(), ?action, "Auth action");
        self.state.send_if_modified(|state| {
            let next = reduce(state, action);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    /// Log in and store the returned user.
    pub async fn login(&self, credentials: &Credentials) -> Result<Value, SessionError> {
        self.dispatch(AuthAction::LoginStarted);

        let endpoint = self.pipeline.endpoints().login.clone();
        let result = self
            .pipeline
            .request(RequestConfig::post(endpoint).json(json!(credentials)))
            .await;

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                if error.class() == FailureClass::Network {
                    self.dispatch(AuthAction::NetworkUnavailable);
                }
                self.dispatch(AuthAction::LoginFailed(error.message.clone()));
                return Err(error.into());
            }
        };

        match extract_user(&response) {
            Some(user) => {
                tracing::info!(actor = %self.actor(), "Logged in");
                self.dispatch(AuthAction::LoginSucceeded(user.clone()));
                Ok(user)
            }
            None => {
                let message = "login response carried no user".to_string();
                self.dispatch(AuthAction::LoginFailed(message.clone()));
                Err(SessionError::InvalidPayload(message))
            }
        }
    }

    /// Log out. Local state is cleared whatever the server says.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let endpoint = self.pipeline.endpoints().logout.clone();
        let result = self.pipeline.request(RequestConfig::post(endpoint)).await;

        self.dispatch(AuthAction::LoggedOut);
        match result {
            Ok(_) => {
                tracing::info!(actor = %self.actor(), "Logged out");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(actor = %self.actor(), error = %error, "Server logout failed, local session cleared");
                Err(error.into())
            }
        }
    }

    /// Check the session by loading the current user.
    pub async fn load_profile(&self) -> Result<Value, SessionError> {
        self.dispatch(AuthAction::ProfileRequested);

        let endpoint = self.pipeline.endpoints().profile.clone();
        let response = self.request(RequestConfig::get(endpoint)).await?;

        match extract_user(&response) {
            Some(user) => {
                self.dispatch(AuthAction::ProfileLoaded(user.clone()));
                Ok(user)
            }
            None => {
                let message = "profile response carried no user".to_string();
                self.dispatch(AuthAction::RequestFailed(message.clone()));
                Err(SessionError::InvalidPayload(message))
            }
        }
    }

    /// Issue an arbitrary request, reflecting failures in auth state.
    pub async fn request(&self, config: RequestConfig) -> Result<ApiResponse, SessionError> {
        match self.pipeline.request(config).await {
            Ok(response) => Ok(response),
            Err(error) => {
                self.dispatch(failure_action(&error));
                Err(error.into())
            }
        }
    }
}

/// State action for a classified failure.
pub fn failure_action(error: &ClassifiedError) -> AuthAction {
    match error.class() {
        FailureClass::AuthHard => AuthAction::SessionExpired,
        FailureClass::AuthSoft => AuthAction::AuthWarning(error.message.clone()),
        FailureClass::Network => AuthAction::NetworkUnavailable,
        FailureClass::Server => AuthAction::RequestFailed(error.message.clone()),
    }
}

/// Accept both `{ "user": {..} }` and a bare user object.
fn extract_user(response: &ApiResponse) -> Option<Value> {
    match &response.body {
        Value::Object(map) => Some(map.get("user").cloned().unwrap_or_else(|| response.body.clone())),
        _ => None,
    }
}
