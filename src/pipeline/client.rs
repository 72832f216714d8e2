//! Authenticated request pipeline.
//!
//! # Responsibilities
//! - Resolve request URLs against the base URL and keep them under the
//!   actor's prefix
//! - Outbound interception: stamp start time, fail fast while offline
//! - Inbound interception: latency logging, failure classification
//! - Network retries with backoff
//! - Single-flight credential refresh and resubmission
//! - Publish session events (expired session, network unavailable)
//!
//! # Design Decisions
//! - All state is owned by the instance; one pipeline per actor
//! - The classification is a pure function; this module only executes
//!   its decisions
//! - The refresh call bypasses classification (it is an auth endpoint) but
//!   still gets network retries

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::{ClientConfig, RetryConfig};
use crate::http::{ApiResponse, PendingRequest, RequestConfig, Transport, TransportError};
use crate::net::Connectivity;
use crate::observability::metrics;
use crate::pipeline::classify::{classify, is_hard_refresh_failure, network_retry_delay, Decision};
use crate::pipeline::error::{ClassifiedError, FailureClass};
use crate::pipeline::refresh::{RefreshOutcome, SingleFlight, Ticket};
use crate::resilience::NoticeThrottle;
use crate::routing::matcher::strip_path_prefix;
use crate::routing::{Actor, AuthEndpoints};
use crate::session::events::{SessionEvent, SessionEvents};

/// Resilient authenticated client for one actor.
pub struct Pipeline<T: Transport> {
    actor: Actor,
    base_url: Url,
    transport: T,
    endpoints: AuthEndpoints,
    retry: RetryConfig,
    latency_warn: Duration,
    metrics_enabled: bool,
    connectivity: Arc<Connectivity>,
    refresh: SingleFlight,
    events: SessionEvents,
    network_notice: NoticeThrottle,
}

impl<T: Transport> Pipeline<T> {
    /// Create a pipeline with its own event bus.
    pub fn new(
        actor: Actor,
        config: &ClientConfig,
        transport: T,
        connectivity: Arc<Connectivity>,
    ) -> Result<Self, ConfigError> {
        let events = SessionEvents::new(config.notifications.event_capacity);
        Self::with_events(actor, config, transport, connectivity, events)
    }

    /// Create a pipeline publishing to an existing event bus.
    pub fn with_events(
        actor: Actor,
        config: &ClientConfig,
        transport: T,
        connectivity: Arc<Connectivity>,
        events: SessionEvents,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.transport.base_url)?;

        tracing::debug!(
            actor = %actor,
            base_url = %base_url,
            prefix = %config.actor(actor).path_prefix,
            "Pipeline initialized"
        );

        Ok(Self {
            actor,
            base_url,
            transport,
            endpoints: AuthEndpoints::from_config(config.actor(actor)),
            retry: config.retries.clone(),
            latency_warn: Duration::from_millis(config.observability.latency_warn_ms),
            metrics_enabled: config.observability.metrics_enabled,
            connectivity,
            refresh: SingleFlight::new(),
            events,
            network_notice: NoticeThrottle::new(Duration::from_millis(
                config.notifications.network_notice_cooldown_ms,
            )),
        })
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    pub fn connectivity(&self) -> &Arc<Connectivity> {
        &self.connectivity
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// True while a refresh flight is running.
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    pub async fn get(&self, url: &str) -> Result<ApiResponse, ClassifiedError> {
        self.request(RequestConfig::get(url)).await
    }

    pub async fn post(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, ClassifiedError> {
        self.request(RequestConfig::post(url).json(body)).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, ClassifiedError> {
        self.request(RequestConfig::put(url).json(body)).await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, ClassifiedError> {
        self.request(RequestConfig::patch(url).json(body)).await
    }

    pub async fn delete(&self, url: &str) -> Result<ApiResponse, ClassifiedError> {
        self.request(RequestConfig::delete(url)).await
    }

    /// Issue a request, transparently handling connectivity loss, transient
    /// network failure and expiring credentials.
    pub async fn request(&self, config: RequestConfig) -> Result<ApiResponse, ClassifiedError> {
        let target = config.url.clone();
        let mut pending = match self.prepare(config) {
            Ok(pending) => pending,
            Err(e) => return Err(self.surface(&target, ClassifiedError::server(e))),
        };

        loop {
            let failure = match self.dispatch(&mut pending).await {
                Ok(response) => return Ok(response),
                Err(failure) => failure,
            };

            match classify(&pending, &failure, &self.endpoints, &self.retry) {
                Decision::RetryNetwork(delay) => {
                    pending.network_retries += 1;
                    tracing::warn!(
                        actor = %self.actor,
                        request_id = %pending.request_id,
                        path = %pending.path(),
                        attempt = pending.network_retries,
                        delay = ?delay,
                        error = %failure,
                        "No response, retrying"
                    );
                    if self.metrics_enabled {
                        metrics::record_network_retry(self.actor);
                    }
                    tokio::time::sleep(delay).await;
                }
                Decision::Refresh => {
                    pending.retried = true;
                    match self.await_refresh(&pending).await {
                        RefreshOutcome::Refreshed => {
                            tracing::debug!(
                                actor = %self.actor,
                                request_id = %pending.request_id,
                                path = %pending.path(),
                                "Resubmitting after refresh"
                            );
                        }
                        RefreshOutcome::Failed { hard } => {
                            // The flight leader already published any session event.
                            return Err(ClassifiedError::auth(failure, hard));
                        }
                    }
                }
                Decision::Fail(error) => {
                    let path = pending.path().to_string();
                    return Err(self.surface(&path, error));
                }
            }
        }
    }

    /// Resolve a caller URL into a pending request routed relative to the
    /// base URL. The route must stay under the actor's prefix.
    fn prepare(&self, config: RequestConfig) -> Result<PendingRequest, TransportError> {
        let url = self.resolve_url(&config.url)?;
        let route = strip_path_prefix(self.base_url.path(), url.path())
            .ok_or_else(|| {
                TransportError::InvalidUrl(format!("{url} is outside base URL {}", self.base_url))
            })?
            .to_string();
        if !self.endpoints.is_actor_path(&route) {
            return Err(TransportError::InvalidUrl(format!(
                "{route} is outside the {} API",
                self.actor
            )));
        }
        Ok(PendingRequest::new(config, url).with_route(route))
    }

    /// Absolute URLs must stay on the base origin; anything else is joined
    /// onto the base URL.
    fn resolve_url(&self, raw: &str) -> Result<Url, TransportError> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;
            if url.origin() != self.base_url.origin() {
                return Err(TransportError::InvalidUrl(format!(
                    "{raw} is outside base URL {}",
                    self.base_url
                )));
            }
            return Ok(url);
        }

        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            raw.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// One submission through both interception points.
    async fn dispatch(&self, pending: &mut PendingRequest) -> Result<ApiResponse, TransportError> {
        pending.start_time = Some(Instant::now());

        if !pending.skip_offline_check && !self.connectivity.is_online() {
            tracing::debug!(
                actor = %self.actor,
                request_id = %pending.request_id,
                path = %pending.path(),
                "Offline, failing fast"
            );
            return Err(TransportError::Offline);
        }

        let result = self.transport.send(pending).await;
        let latency = pending.elapsed();

        let status = match &result {
            Ok(response) => response.status,
            Err(e) => e.status().unwrap_or(0),
        };
        if self.metrics_enabled {
            metrics::record_request(self.actor, pending.method.as_str(), status, latency);
        }

        let response = result?;
        if latency > self.latency_warn {
            tracing::warn!(
                actor = %self.actor,
                request_id = %pending.request_id,
                path = %pending.path(),
                latency_ms = latency.as_millis() as u64,
                "Slow API response"
            );
        }

        Ok(ApiResponse {
            status: response.status,
            body: response.body,
            latency,
        })
    }

    /// Submit with network retries only. Used for the refresh call.
    async fn dispatch_with_retries(
        &self,
        pending: &mut PendingRequest,
    ) -> Result<ApiResponse, TransportError> {
        loop {
            match self.dispatch(pending).await {
                Err(TransportError::NoResponse(reason)) => {
                    let Some(delay) = network_retry_delay(pending, &self.retry) else {
                        return Err(TransportError::NoResponse(reason));
                    };
                    pending.network_retries += 1;
                    tracing::warn!(
                        actor = %self.actor,
                        attempt = pending.network_retries,
                        delay = ?delay,
                        "Refresh got no response, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Lead a refresh flight or wait for the running one.
    async fn await_refresh(&self, pending: &PendingRequest) -> RefreshOutcome {
        let guard = match self.refresh.join() {
            Ticket::Follower(rx) => {
                tracing::debug!(
                    actor = %self.actor,
                    request_id = %pending.request_id,
                    waiting = self.refresh.waiting(),
                    "Refresh in flight, queueing request"
                );
                return rx.await.unwrap_or(RefreshOutcome::Failed { hard: false });
            }
            Ticket::Leader(guard) => guard,
        };

        tracing::info!(
            actor = %self.actor,
            request_id = %pending.request_id,
            "Access token rejected, refreshing session"
        );

        let outcome = match self.refresh_credentials().await {
            Ok(()) => RefreshOutcome::Refreshed,
            Err(failure) => {
                let hard = is_hard_refresh_failure(&failure);
                tracing::warn!(
                    actor = %self.actor,
                    error = %failure,
                    hard,
                    "Session refresh failed"
                );
                RefreshOutcome::Failed { hard }
            }
        };

        let woken = guard.settle(outcome);
        tracing::debug!(actor = %self.actor, woken, outcome = outcome.as_str(), "Refresh settled");

        if self.metrics_enabled {
            metrics::record_refresh(self.actor, outcome);
        }
        if outcome == (RefreshOutcome::Failed { hard: true }) {
            self.expire_session();
        }
        outcome
    }

    async fn refresh_credentials(&self) -> Result<(), TransportError> {
        let mut pending = self.prepare(RequestConfig::post(self.endpoints.refresh.clone()))?;
        self.dispatch_with_retries(&mut pending).await.map(|_| ())
    }

    /// Apply side effects of a terminal classification and hand it back.
    fn surface(&self, path: &str, error: ClassifiedError) -> ClassifiedError {
        match error.class() {
            FailureClass::AuthHard => self.expire_session(),
            FailureClass::Network => self.notify_network_unavailable(),
            FailureClass::AuthSoft | FailureClass::Server => {}
        }

        tracing::debug!(
            actor = %self.actor,
            path = %path,
            kind = %error.kind,
            status = ?error.status,
            code = ?error.code,
            refresh_failed = error.refresh_failed,
            "Request failed"
        );
        error
    }

    fn expire_session(&self) {
        tracing::warn!(actor = %self.actor, "Session expired, forcing logout");
        if self.metrics_enabled {
            metrics::record_session_expired(self.actor);
        }
        self.events.publish(SessionEvent::SessionExpired { actor: self.actor });
    }

    fn notify_network_unavailable(&self) {
        if self.network_notice.try_acquire() {
            self.events.publish(SessionEvent::NetworkUnavailable { actor: self.actor });
        }
    }
}

impl<T: Transport> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("actor", &self.actor)
            .field("base_url", &self.base_url.as_str())
            .field("refreshing", &self.refresh.is_refreshing())
            .field("waiting", &self.refresh.waiting())
            .finish()
    }
}
