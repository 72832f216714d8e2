//! Successful response returned to callers.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// A 2xx response with its decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `Value::Null` for empty bodies.
    pub body: Value,
    /// Round-trip time of the final submission.
    pub latency: Duration,
}

impl ApiResponse {
    /// Deserialize the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}
