//! Local stand-in for the ride API, for trying the CLI by hand.
//!
//! Access tokens live for 30 seconds; refresh tokens until logout.
//! Tokens travel as cookies, as the real backend does.
//!
//! ```text
//! cargo run --example mock_api
//! cargo run -- --base-url http://127.0.0.1:5000 --email ada@rides.test --password pw profile
//! ```

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

const ACCESS_TTL: Duration = Duration::from_secs(30);

#[derive(Default)]
struct Sessions {
    /// access token -> (email, issued at)
    access: HashMap<String, (String, Instant)>,
    /// refresh token -> email
    refresh: HashMap<String, String>,
}

type Shared = Arc<Mutex<Sessions>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let state: Shared = Arc::default();

    let app = Router::new()
        .route("/api/{actor}/login", post(login))
        .route("/api/{actor}/refresh-token", post(refresh))
        .route("/api/{actor}/profile", get(profile))
        .route("/api/{actor}/logout", post(logout))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 5000));
    println!("Mock ride API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

fn issue_access(sessions: &mut Sessions, email: &str) -> String {
    let token = Uuid::new_v4().to_string();
    sessions
        .access
        .insert(token.clone(), (email.to_string(), Instant::now()));
    token
}

async fn login(
    State(state): State<Shared>,
    Path(actor): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return error(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "Invalid credentials");
    }

    let mut sessions = state.lock().unwrap();
    let access = issue_access(&mut sessions, email);
    let refresh = Uuid::new_v4().to_string();
    sessions.refresh.insert(refresh.clone(), email.to_string());

    (
        StatusCode::OK,
        [
            (header::SET_COOKIE, format!("accessToken={access}; Path=/; HttpOnly")),
            (header::SET_COOKIE, format!("refreshToken={refresh}; Path=/; HttpOnly")),
        ],
        Json(json!({ "user": { "email": email, "role": actor } })),
    )
        .into_response()
}

async fn refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut sessions = state.lock().unwrap();
    let Some(email) = cookie(&headers, "refreshToken")
        .and_then(|token| sessions.refresh.get(&token).cloned())
    else {
        return error(StatusCode::FORBIDDEN, "REFRESH_INVALID", "Refresh token invalid");
    };

    let access = issue_access(&mut sessions, &email);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("accessToken={access}; Path=/; HttpOnly"))],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

async fn profile(
    State(state): State<Shared>,
    Path(actor): Path<String>,
    headers: HeaderMap,
) -> Response {
    let sessions = state.lock().unwrap();
    let Some(token) = cookie(&headers, "accessToken") else {
        return error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Not logged in");
    };
    match sessions.access.get(&token) {
        Some((email, issued)) if issued.elapsed() < ACCESS_TTL => {
            Json(json!({ "user": { "email": email, "role": actor } })).into_response()
        }
        Some(_) => error(StatusCode::UNAUTHORIZED, "ACCESS_TOKEN_EXPIRED", "Access token expired"),
        None => error(StatusCode::UNAUTHORIZED, "ACCESS_TOKEN_INVALID", "Access token invalid"),
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut sessions = state.lock().unwrap();
    if let Some(token) = cookie(&headers, "accessToken") {
        sessions.access.remove(&token);
    }
    if let Some(token) = cookie(&headers, "refreshToken") {
        sessions.refresh.remove(&token);
    }
    (
        StatusCode::OK,
        [
            (header::SET_COOKIE, "accessToken=; Path=/; Max-Age=0".to_string()),
            (header::SET_COOKIE, "refreshToken=; Path=/; Max-Age=0".to_string()),
        ],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}
