//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, delays ordered)
//! - Detect conflicting actor prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{ActorConfig, ClientConfig};
use crate::routing::Actor;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("transport.base_url '{url}' is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("retries.max_delay_ms ({max}) is lower than retries.base_delay_ms ({base})")]
    DelayOrder { base: u64, max: u64 },

    #[error("retries.jitter_ratio must be within 0.0..=1.0, got {0}")]
    Jitter(f64),

    #[error("{actor}.path_prefix '{prefix}' must start with '/'")]
    Prefix { actor: Actor, prefix: String },

    #[error("{actor}.{field} must not be empty")]
    EmptyEndpoint { actor: Actor, field: &'static str },

    #[error("passenger and driver share the path prefix '{0}'")]
    SharedPrefix(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.transport.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::BaseUrl {
            url: config.transport.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::BaseUrl {
            url: config.transport.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "transport.timeout_secs" });
    }
    if config.transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "transport.connect_timeout_secs" });
    }

    let retries = &config.retries;
    if retries.base_delay_ms == 0 {
        errors.push(ValidationError::Zero { field: "retries.base_delay_ms" });
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::DelayOrder {
            base: retries.base_delay_ms,
            max: retries.max_delay_ms,
        });
    }
    if !(0.0..=1.0).contains(&retries.jitter_ratio) {
        errors.push(ValidationError::Jitter(retries.jitter_ratio));
    }

    if config.notifications.event_capacity == 0 {
        errors.push(ValidationError::Zero { field: "notifications.event_capacity" });
    }

    for actor in Actor::ALL {
        validate_actor(actor, config.actor(actor), &mut errors);
    }

    let passenger = config.passenger.path_prefix.trim_end_matches('/');
    if passenger == config.driver.path_prefix.trim_end_matches('/') {
        errors.push(ValidationError::SharedPrefix(passenger.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_actor(actor: Actor, config: &ActorConfig, errors: &mut Vec<ValidationError>) {
    if !config.path_prefix.starts_with('/') {
        errors.push(ValidationError::Prefix {
            actor,
            prefix: config.path_prefix.clone(),
        });
    }

    let endpoints = [
        ("login_path", &config.login_path),
        ("logout_path", &config.logout_path),
        ("refresh_path", &config.refresh_path),
        ("profile_path", &config.profile_path),
    ];
    for (field, value) in endpoints {
        if value.trim_matches('/').is_empty() {
            errors.push(ValidationError::EmptyEndpoint { actor, field });
        }
    }
}
