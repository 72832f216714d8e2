//! Classified failures handed back to callers.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::http::TransportError;

/// Top-level failure kind, serialized as the `__type` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    #[serde(rename = "AUTH_ERROR")]
    Auth,
    #[serde(rename = "SERVER_ERROR")]
    Server,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Auth => "AUTH_ERROR",
            ErrorKind::Server => "SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four terminal outcomes a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Network,
    /// Keep the local session, surface a warning.
    AuthSoft,
    /// Force logout.
    AuthHard,
    Server,
}

/// Error codes the backend attaches to auth failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    AccessTokenExpired,
    AccessTokenInvalid,
    Unauthenticated,
    InvalidSession,
    JwtInvalid,
    RefreshInvalid,
    Other(String),
}

impl ErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "ACCESS_TOKEN_EXPIRED" => ErrorCode::AccessTokenExpired,
            "ACCESS_TOKEN_INVALID" => ErrorCode::AccessTokenInvalid,
            "UNAUTHENTICATED" => ErrorCode::Unauthenticated,
            "INVALID_SESSION" => ErrorCode::InvalidSession,
            "JWT_INVALID" => ErrorCode::JwtInvalid,
            "REFRESH_INVALID" => ErrorCode::RefreshInvalid,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    /// The access token is stale; a refresh may fix it.
    pub fn is_access_token_problem(&self) -> bool {
        matches!(
            self,
            ErrorCode::AccessTokenExpired | ErrorCode::AccessTokenInvalid | ErrorCode::Unauthenticated
        )
    }

    /// The session itself is gone; only a new login fixes it.
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidSession | ErrorCode::JwtInvalid | ErrorCode::RefreshInvalid
        )
    }
}

/// A failure after classification by the pipeline.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    #[serde(rename = "__type")]
    pub kind: ErrorKind,
    /// Set on hard auth failures: the session cannot be recovered.
    #[serde(rename = "refreshFailed")]
    pub refresh_failed: bool,
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
    #[serde(skip)]
    pub source: TransportError,
}

impl ClassifiedError {
    fn from_transport(kind: ErrorKind, refresh_failed: bool, source: TransportError) -> Self {
        let message = source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| source.to_string());
        Self {
            kind,
            refresh_failed,
            status: source.status(),
            code: source.code().map(str::to_string),
            message,
            source,
        }
    }

    pub fn network(source: TransportError) -> Self {
        Self::from_transport(ErrorKind::Network, false, source)
    }

    /// Auth failure; `refresh_failed` marks it hard.
    pub fn auth(source: TransportError, refresh_failed: bool) -> Self {
        Self::from_transport(ErrorKind::Auth, refresh_failed, source)
    }

    pub fn server(source: TransportError) -> Self {
        Self::from_transport(ErrorKind::Server, false, source)
    }

    pub fn class(&self) -> FailureClass {
        match (self.kind, self.refresh_failed) {
            (ErrorKind::Network, _) => FailureClass::Network,
            (ErrorKind::Auth, true) => FailureClass::AuthHard,
            (ErrorKind::Auth, false) => FailureClass::AuthSoft,
            (ErrorKind::Server, _) => FailureClass::Server,
        }
    }

    pub fn is_hard_auth(&self) -> bool {
        self.class() == FailureClass::AuthHard
    }
}
