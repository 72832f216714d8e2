//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::Actor;

/// Root configuration for the API clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Transport settings (base URL, timeouts, credentials).
    pub transport: TransportConfig,

    /// Network failure retry configuration.
    pub retries: RetryConfig,

    /// User-facing notice settings.
    pub notifications: NotificationConfig,

    /// Passenger API surface.
    pub passenger: ActorConfig,

    /// Driver API surface.
    pub driver: ActorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            retries: RetryConfig::default(),
            notifications: NotificationConfig::default(),
            passenger: ActorConfig::for_actor(Actor::Passenger),
            driver: ActorConfig::for_actor(Actor::Driver),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for a single actor.
    pub fn actor(&self, actor: Actor) -> &ActorConfig {
        match actor {
            Actor::Passenger => &self.passenger,
            Actor::Driver => &self.driver,
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// API base URL (overridden by `VITE_API_BASE_URL`).
    pub base_url: String,

    /// Total time for request/response in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Keep and send credential cookies.
    pub with_credentials: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
            with_credentials: true,
        }
    }
}

/// Retry configuration for requests that never got a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable network retries.
    pub enabled: bool,

    /// Maximum number of resubmissions after a network failure.
    pub max_network_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Jitter added on top of each delay, as a fraction of it (0.0 = none).
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_network_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 5000,
            jitter_ratio: 0.0,
        }
    }
}

/// Notice and event bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Minimum spacing between two "network unavailable" notices.
    pub network_notice_cooldown_ms: u64,

    /// Buffered session events per subscriber.
    pub event_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            network_notice_cooldown_ms: 5000,
            event_capacity: 64,
        }
    }
}

/// Per-actor API surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActorConfig {
    /// Path prefix all of this actor's routes live under.
    pub path_prefix: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    #[serde(default = "default_profile_path")]
    pub profile_path: String,
}

fn default_login_path() -> String {
    "login".to_string()
}

fn default_logout_path() -> String {
    "logout".to_string()
}

fn default_refresh_path() -> String {
    "refresh-token".to_string()
}

fn default_profile_path() -> String {
    "profile".to_string()
}

impl ActorConfig {
    /// Default surface for an actor.
    pub fn for_actor(actor: Actor) -> Self {
        Self {
            path_prefix: actor.default_prefix().to_string(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            refresh_path: default_refresh_path(),
            profile_path: default_profile_path(),
        }
    }

    /// Full path of an endpoint under this actor's prefix.
    pub fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.path_prefix.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Successful responses slower than this are logged as warnings.
    pub latency_warn_ms: u64,

    /// Record request metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            latency_warn_ms: 3000,
            metrics_enabled: true,
        }
    }
}
