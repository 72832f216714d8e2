//! HTTP transport boundary.
//!
//! # Responsibilities
//! - Define the `Transport` trait the pipeline wraps
//! - Normalize transport failures into `TransportError`
//! - Provide the production reqwest-backed transport
//!
//! # Design Decisions
//! - Non-2xx responses are errors carrying `{ status, data: { code, message } }`
//! - Missing responses (connect, timeout, reset, truncated body) are
//!   `NoResponse`; they are the only failures eligible for network retry
//! - Requests reqwest refuses to build never leave the process and are
//!   `InvalidRequest`
//! - Credentials travel as cookies; each transport owns its own cookie jar

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::TransportConfig;
use crate::http::request::{PendingRequest, X_REQUEST_ID};

/// A 2xx response as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Error payload carried by failed responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorData {
    /// Extract `code` and `message` from an arbitrary JSON body.
    pub fn from_body(body: &Value) -> Self {
        let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            code: field("code"),
            message: field("message").or_else(|| field("error")),
        }
    }
}

/// A non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    #[serde(default)]
    pub data: ErrorData,
}

impl ErrorResponse {
    pub fn new(status: u16, code: Option<&str>) -> Self {
        Self {
            status,
            data: ErrorData {
                code: code.map(str::to_string),
                message: None,
            },
        }
    }
}

/// Why a transport call did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Connectivity is known to be down; nothing was sent.
    #[error("network unavailable: client is offline")]
    Offline,

    /// The request was sent but no response arrived.
    #[error("no response received: {0}")]
    NoResponse(String),

    /// The server answered with a non-2xx status.
    #[error("request failed with status {}", .0.status)]
    Status(ErrorResponse),

    /// The request could not be built for this client.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    /// The HTTP client rejected the request before sending it.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status(response) => Some(response.status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            TransportError::Status(response) => response.data.code.as_deref(),
            _ => None,
        }
    }

    /// Server-provided message, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Status(response) => response.data.message.as_deref(),
            _ => None,
        }
    }
}

/// An HTTP client the pipeline can drive.
pub trait Transport: Send + Sync + 'static {
    /// Issue one request. Non-2xx statuses are returned as errors.
    fn send(
        &self,
        request: &PendingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: &PendingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

/// Production transport over reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with its own cookie jar.
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .cookie_store(config.with_credentials)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &PendingRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(X_REQUEST_ID, request.request_id.to_string());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::NoResponse(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::NoResponse(format!("reading body: {e}")))?;
        let body = decode_body(&bytes);

        if status.is_success() {
            Ok(TransportResponse::new(status.as_u16(), body))
        } else {
            Err(TransportError::Status(ErrorResponse {
                status: status.as_u16(),
                data: ErrorData::from_body(&body),
            }))
        }
    }
}

/// JSON when possible, raw text otherwise, `Null` when empty.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
