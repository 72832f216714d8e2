//! Outgoing request descriptions.
//!
//! # Responsibilities
//! - Caller-facing `RequestConfig` builder (method, url, body, opt-out flags)
//! - `PendingRequest`: the in-flight call with its retry bookkeeping
//! - Request ID generation for correlation across retries
//!
//! # Design Decisions
//! - One request ID per logical call; resubmissions keep it
//! - `retried` is set once a refresh has been attempted for the call and is
//!   never cleared, which bounds refresh/resubmit to a single cycle

use reqwest::Method;
use serde_json::Value;
use tokio::time::Instant;
use url::Url;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Description of a call, as supplied by calling code.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL on the same origin.
    pub url: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// Never resubmit after a network failure.
    pub skip_retry: bool,
    /// Send even when connectivity is known to be down.
    pub skip_offline_check: bool,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            skip_retry: false,
            skip_offline_check: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn skip_retry(mut self) -> Self {
        self.skip_retry = true;
        self
    }

    pub fn skip_offline_check(mut self) -> Self {
        self.skip_offline_check = true;
        self
    }
}

/// A call travelling through the pipeline.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request_id: Uuid,
    pub method: Method,
    pub url: Url,
    /// URL path relative to the client's base URL, used for endpoint matching.
    pub route: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// Stamped on every submission, for latency logging.
    pub start_time: Option<Instant>,
    /// A refresh has already been attempted for this call.
    pub retried: bool,
    /// Resubmissions caused by missing responses so far.
    pub network_retries: u32,
    pub skip_retry: bool,
    pub skip_offline_check: bool,
}

impl PendingRequest {
    /// Create a pending request targeting an already resolved URL. The route
    /// defaults to the full URL path.
    pub fn new(config: RequestConfig, url: Url) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: config.method,
            route: url.path().to_string(),
            url,
            body: config.body,
            headers: config.headers,
            start_time: None,
            retried: false,
            network_retries: 0,
            skip_retry: config.skip_retry,
            skip_offline_check: config.skip_offline_check,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Time since the latest submission was stamped.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }
}
