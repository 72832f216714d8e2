//! Failure classification, network retries and session events.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::Instant;

use ride_client::http::RequestConfig;
use ride_client::net::Connectivity;
use ride_client::pipeline::{ErrorKind, FailureClass};
use ride_client::{Actor, Pipeline, SessionEvent};

mod common;
use common::{expired, fail, ok, Reply, ScriptedTransport};

const RIDES: &str = "/api/user/rides";
const REFRESH: &str = "/api/user/refresh-token";

#[tokio::test(start_paused = true)]
async fn test_auth_endpoints_never_refresh() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/api/user/login", vec![fail(401, "ACCESS_TOKEN_EXPIRED")])
            .route("/api/user/logout", vec![fail(401, "UNAUTHENTICATED")])
            .route(REFRESH, vec![fail(401, "ACCESS_TOKEN_EXPIRED")]),
    );
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());

    let err = pipeline
        .post("/api/user/login", json!({ "email": "a@b.c", "password": "x" }))
        .await
        .unwrap_err();
    assert_eq!(err.class(), FailureClass::AuthSoft);
    assert_eq!(err.status, Some(401));

    let err = pipeline.post("/api/user/logout", json!({})).await.unwrap_err();
    assert_eq!(err.class(), FailureClass::AuthSoft);

    let err = pipeline.post(REFRESH, json!({})).await.unwrap_err();
    assert_eq!(err.class(), FailureClass::AuthSoft);

    // Only the direct call above reached the refresh endpoint.
    assert_eq!(transport.calls(REFRESH), 1);
    assert_eq!(transport.calls("/api/user/login"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_auth_endpoint_other_status_is_server_error() {
    let transport = Arc::new(
        ScriptedTransport::new().route("/api/user/login", vec![fail(403, "INVALID_SESSION")]),
    );
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());
    let mut events = pipeline.subscribe();

    let err = pipeline.post("/api/user/login", json!({})).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test(start_paused = true)]
async fn test_network_retries_back_off_then_fail() {
    let transport = Arc::new(ScriptedTransport::new().route(RIDES, vec![Reply::NoResponse]));
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());

    let start = Instant::now();
    let err = pipeline.get(RIDES).await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(transport.calls(RIDES), 4);
    assert!(elapsed >= Duration::from_secs(7), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(7100), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_network_retry_recovers() {
    let transport = Arc::new(ScriptedTransport::new().route(
        RIDES,
        vec![Reply::NoResponse, Reply::NoResponse, ok(json!({ "rides": [] }))],
    ));
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());

    let start = Instant::now();
    let response = pipeline.get(RIDES).await.unwrap();

    assert_eq!(response.body, json!({ "rides": [] }));
    assert_eq!(transport.calls(RIDES), 3);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_cap_from_config() {
    let transport = Arc::new(ScriptedTransport::new().route(RIDES, vec![Reply::NoResponse]));
    let mut config = common::test_config();
    config.retries.max_delay_ms = 1500;
    let pipeline = Pipeline::new(
        Actor::Passenger,
        &config,
        transport.clone(),
        Arc::new(Connectivity::new()),
    )
    .unwrap();

    let start = Instant::now();
    pipeline.get(RIDES).await.unwrap_err();
    let elapsed = start.elapsed();

    // 1000 + 1500 + 1500
    assert!(elapsed >= Duration::from_millis(4000), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(4100), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_skip_retry_and_disabled_retries() {
    let transport = Arc::new(ScriptedTransport::new().route(RIDES, vec![Reply::NoResponse]));
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());

    let err = pipeline
        .request(RequestConfig::get(RIDES).skip_retry())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(transport.calls(RIDES), 1);

    let mut config = common::test_config();
    config.retries.enabled = false;
    let pipeline = Pipeline::new(
        Actor::Passenger,
        &config,
        transport.clone(),
        Arc::new(Connectivity::new()),
    )
    .unwrap();
    pipeline.get(RIDES).await.unwrap_err();
    assert_eq!(transport.calls(RIDES), 2);
}

#[tokio::test(start_paused = true)]
async fn test_offline_fails_fast() {
    let transport = Arc::new(ScriptedTransport::new().route(RIDES, vec![ok(json!({}))]));
    let connectivity = Arc::new(Connectivity::new());
    let pipeline = Pipeline::new(
        Actor::Passenger,
        &common::test_config(),
        transport.clone(),
        connectivity.clone(),
    )
    .unwrap();

    connectivity.set_offline();
    let start = Instant::now();
    let err = pipeline.get(RIDES).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(transport.total_calls(), 0);

    let response = pipeline
        .request(RequestConfig::get(RIDES).skip_offline_check())
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test(start_paused = true)]
async fn test_network_banner_is_throttled() {
    let transport = Arc::new(ScriptedTransport::new());
    let connectivity = Arc::new(Connectivity::new());
    let pipeline = Pipeline::new(
        Actor::Driver,
        &common::test_config(),
        transport,
        connectivity.clone(),
    )
    .unwrap();
    let mut events = pipeline.subscribe();
    connectivity.set_offline();

    pipeline.get("/api/driver/trips").await.unwrap_err();
    pipeline.get("/api/driver/trips").await.unwrap_err();
    assert_eq!(
        events.try_recv(),
        Ok(SessionEvent::NetworkUnavailable { actor: Actor::Driver })
    );
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

    tokio::time::advance(Duration::from_secs(5)).await;
    pipeline.get("/api/driver/trips").await.unwrap_err();
    assert_eq!(
        events.try_recv(),
        Ok(SessionEvent::NetworkUnavailable { actor: Actor::Driver })
    );
}

#[tokio::test(start_paused = true)]
async fn test_hard_code_expires_session_without_refresh() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route(RIDES, vec![fail(403, "INVALID_SESSION")])
            .route("/api/user/wallet", vec![fail(401, "JWT_INVALID")]),
    );
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());
    let mut events = pipeline.subscribe();

    let err = pipeline.get(RIDES).await.unwrap_err();
    assert_eq!(err.class(), FailureClass::AuthHard);
    assert_eq!(
        events.try_recv(),
        Ok(SessionEvent::SessionExpired { actor: Actor::Passenger })
    );

    let err = pipeline.get("/api/user/wallet").await.unwrap_err();
    assert!(err.is_hard_auth());
    assert_eq!(transport.calls(REFRESH), 0);
}

#[tokio::test(start_paused = true)]
async fn test_every_outcome_has_one_class() {
    let cases = [
        (Reply::NoResponse, FailureClass::Network),
        (expired(), FailureClass::AuthSoft),
        (Reply::Fail(401, None), FailureClass::AuthSoft),
        (fail(403, "JWT_INVALID"), FailureClass::AuthHard),
        (fail(403, "FORBIDDEN"), FailureClass::Server),
        (fail(404, "RIDE_NOT_FOUND"), FailureClass::Server),
        (fail(500, "INTERNAL"), FailureClass::Server),
    ];

    for (reply, expected) in cases {
        let transport = Arc::new(
            ScriptedTransport::new()
                .route(RIDES, vec![reply.clone()])
                .route(REFRESH, vec![ok(json!({ "ok": true }))]),
        );
        let pipeline = common::pipeline(Actor::Passenger, transport);

        let err = pipeline.get(RIDES).await.unwrap_err();
        assert_eq!(err.class(), expected, "reply {reply:?}");

        let value = serde_json::to_value(&err).unwrap();
        let marker = value["__type"].as_str().unwrap();
        assert!(
            ["NETWORK_ERROR", "AUTH_ERROR", "SERVER_ERROR"].contains(&marker),
            "reply {reply:?}"
        );
        assert_eq!(value["refreshFailed"], expected == FailureClass::AuthHard);
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_response_still_succeeds() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route(RIDES, vec![ok(json!({ "rides": [] }))])
            .latency(RIDES, Duration::from_millis(3500)),
    );
    let pipeline = common::pipeline(Actor::Passenger, transport);

    let response = pipeline.get(RIDES).await.unwrap();

    assert!(response.latency >= Duration::from_millis(3500));
    assert!(response.latency < Duration::from_millis(3600));
}

#[tokio::test(start_paused = true)]
async fn test_url_resolution() {
    let transport = Arc::new(ScriptedTransport::new().route(RIDES, vec![ok(json!({}))]));
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());

    pipeline.get("api/user/rides").await.unwrap();
    pipeline.get("http://localhost:5000/api/user/rides").await.unwrap();
    assert_eq!(transport.calls(RIDES), 2);

    let err = pipeline.get("https://elsewhere.test/api/user/rides").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(transport.calls(RIDES), 2);
}

fn pipeline_with_base(base_url: &str, transport: Arc<ScriptedTransport>) -> Pipeline<Arc<ScriptedTransport>> {
    let mut config = common::test_config();
    config.transport.base_url = base_url.to_string();
    ride_client::config::validate_config(&config).unwrap();
    Pipeline::new(Actor::Passenger, &config, transport, Arc::new(Connectivity::new())).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_auth_endpoints_under_base_path_never_refresh() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/backend/api/user/login", vec![expired()])
            .route("/backend/api/user/refresh-token", vec![ok(json!({ "ok": true }))]),
    );
    let pipeline = pipeline_with_base("http://localhost:5000/backend", transport.clone());

    let err = pipeline
        .post("/api/user/login", json!({ "email": "a@b.c", "password": "x" }))
        .await
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::AuthSoft);
    assert_eq!(transport.calls("/backend/api/user/refresh-token"), 0);
    assert_eq!(transport.calls("/backend/api/user/login"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_under_base_path() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/backend/api/user/rides", vec![expired(), ok(json!({ "rides": [] }))])
            .route("/backend/api/user/refresh-token", vec![ok(json!({ "ok": true }))]),
    );
    let pipeline = pipeline_with_base("http://localhost:5000/backend/", transport.clone());

    let response = pipeline.get("/api/user/rides").await.unwrap();

    assert_eq!(response.body, json!({ "rides": [] }));
    assert_eq!(transport.calls("/backend/api/user/refresh-token"), 1);
    assert_eq!(transport.calls("/backend/api/user/rides"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_absolute_url_must_stay_under_base_path() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/backend/api/user/rides", vec![ok(json!({}))])
            .route("/backendX/api/user/rides", vec![ok(json!({}))]),
    );
    let pipeline = pipeline_with_base("http://localhost:5000/backend", transport.clone());

    pipeline
        .get("http://localhost:5000/backend/api/user/rides")
        .await
        .unwrap();

    let err = pipeline
        .get("http://localhost:5000/backendX/api/user/rides")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(transport.calls("/backendX/api/user/rides"), 0);
    assert_eq!(transport.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_requests_stay_under_actor_prefix() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/api/driver/trips", vec![ok(json!({}))])
            .route("/api/username", vec![ok(json!({}))]),
    );
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());
    let mut events = pipeline.subscribe();

    for url in ["/api/driver/trips", "/api/username", "/api/user/../driver/trips"] {
        let err = pipeline.get(url).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server, "url {url}");
    }
    assert_eq!(transport.total_calls(), 0);
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test(start_paused = true)]
async fn test_patch_and_debug() {
    let transport = Arc::new(
        ScriptedTransport::new().route("/api/user/rides/7", vec![ok(json!({ "status": "cancelled" }))]),
    );
    let pipeline = common::pipeline(Actor::Passenger, transport.clone());

    let response = pipeline
        .patch("/api/user/rides/7", json!({ "status": "cancelled" }))
        .await
        .unwrap();
    assert_eq!(response.body["status"], "cancelled");

    let debug = format!("{pipeline:?}");
    assert!(debug.contains("refreshing: false"), "{debug}");
    assert!(debug.contains("waiting: 0"), "{debug}");
}
