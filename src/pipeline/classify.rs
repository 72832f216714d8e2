//! Failure classification.
//!
//! # Order of evaluation
//! ```text
//! 1. no response          → retry with backoff while budget remains, else NETWORK_ERROR
//! 2. auth endpoint        → 401: AUTH_ERROR, otherwise SERVER_ERROR (never refresh)
//! 3. 401 + token problem  → refresh once, then resubmit
//! 4. hard session code    → AUTH_ERROR, refresh_failed
//! 5. anything else        → SERVER_ERROR
//! ```
//!
//! A 401 with no code at all counts as a token problem in step 3. That is
//! permissive: a role or permission failure answered with a bare 401 will
//! trigger one refresh before surfacing.

use std::time::Duration;

use crate::config::schema::RetryConfig;
use crate::http::{PendingRequest, TransportError};
use crate::pipeline::error::{ClassifiedError, ErrorCode};
use crate::resilience::backoff::calculate_backoff;
use crate::routing::AuthEndpoints;

const UNAUTHORIZED: u16 = 401;
const FORBIDDEN: u16 = 403;

/// What the pipeline does next with a failed submission.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Wait, then resubmit the same request.
    RetryNetwork(Duration),
    /// Refresh credentials (or wait for the in-flight refresh), then resubmit.
    Refresh,
    /// Terminal.
    Fail(ClassifiedError),
}

/// Classify a failed submission.
pub fn classify(
    request: &PendingRequest,
    failure: &TransportError,
    endpoints: &AuthEndpoints,
    retry: &RetryConfig,
) -> Decision {
    let response = match failure {
        TransportError::Offline => return Decision::Fail(ClassifiedError::network(failure.clone())),
        TransportError::NoResponse(_) => {
            return match network_retry_delay(request, retry) {
                Some(delay) => Decision::RetryNetwork(delay),
                None => Decision::Fail(ClassifiedError::network(failure.clone())),
            };
        }
        TransportError::InvalidUrl(_) | TransportError::InvalidRequest(_) => {
            return Decision::Fail(ClassifiedError::server(failure.clone()))
        }
        TransportError::Status(response) => response,
    };

    let code = response.data.code.as_deref().map(ErrorCode::parse);

    if endpoints.is_auth_endpoint(request.route()) {
        return if response.status == UNAUTHORIZED {
            Decision::Fail(ClassifiedError::auth(failure.clone(), false))
        } else {
            Decision::Fail(ClassifiedError::server(failure.clone()))
        };
    }

    let token_problem = code.as_ref().map_or(true, ErrorCode::is_access_token_problem);
    if response.status == UNAUTHORIZED && token_problem {
        return if request.retried {
            // Refreshed once already and still rejected.
            Decision::Fail(ClassifiedError::auth(failure.clone(), false))
        } else {
            Decision::Refresh
        };
    }

    if code.as_ref().is_some_and(ErrorCode::is_hard_failure) {
        return Decision::Fail(ClassifiedError::auth(failure.clone(), true));
    }

    Decision::Fail(ClassifiedError::server(failure.clone()))
}

/// Backoff before the next network resubmission, or `None` when the request
/// must not be resubmitted.
pub fn network_retry_delay(request: &PendingRequest, retry: &RetryConfig) -> Option<Duration> {
    if !retry.enabled || request.skip_retry || request.network_retries >= retry.max_network_retries {
        return None;
    }
    Some(calculate_backoff(
        request.network_retries,
        retry.base_delay_ms,
        retry.max_delay_ms,
        retry.jitter_ratio,
    ))
}

/// A failed refresh is hard only for 401/403 carrying a session-ending code.
pub fn is_hard_refresh_failure(failure: &TransportError) -> bool {
    match failure {
        TransportError::Status(response) => {
            matches!(response.status, UNAUTHORIZED | FORBIDDEN)
                && response
                    .data
                    .code
                    .as_deref()
                    .is_some_and(|code| ErrorCode::parse(code).is_hard_failure())
        }
        _ => false,
    }
}
