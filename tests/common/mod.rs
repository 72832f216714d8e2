//! Shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use ride_client::config::ClientConfig;
use ride_client::http::{
    ErrorData, ErrorResponse, PendingRequest, Transport, TransportError, TransportResponse,
};
use ride_client::net::Connectivity;
use ride_client::{Actor, Pipeline};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Fail(u16, Option<&'static str>),
    NoResponse,
}

pub fn ok(body: Value) -> Reply {
    Reply::Ok(body)
}

pub fn fail(status: u16, code: &'static str) -> Reply {
    Reply::Fail(status, Some(code))
}

pub fn expired() -> Reply {
    fail(401, "ACCESS_TOKEN_EXPIRED")
}

/// In-memory transport answering from per-path reply queues.
///
/// Each path pops its queue in order; the last reply repeats forever.
/// Unknown paths answer 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    latency: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into());
        self
    }

    /// Delay every answer on `path`.
    pub fn latency(mut self, path: &str, delay: Duration) -> Self {
        self.latency.insert(path.to_string(), delay);
        self
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Fail(404, None)),
            None => Reply::Fail(404, None),
        }
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &PendingRequest) -> Result<TransportResponse, TransportError> {
        let path = request.path().to_string();
        self.calls.lock().unwrap().push(path.clone());

        if let Some(delay) = self.latency.get(&path) {
            tokio::time::sleep(*delay).await;
        }

        match self.next_reply(&path) {
            Reply::Ok(body) => Ok(TransportResponse::new(200, body)),
            Reply::Fail(status, code) => Err(TransportError::Status(ErrorResponse {
                status,
                data: ErrorData {
                    code: code.map(str::to_string),
                    message: None,
                },
            })),
            Reply::NoResponse => Err(TransportError::NoResponse("connection refused".into())),
        }
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default()
}

pub fn pipeline(actor: Actor, transport: Arc<ScriptedTransport>) -> Pipeline<Arc<ScriptedTransport>> {
    Pipeline::new(actor, &test_config(), transport, Arc::new(Connectivity::new())).unwrap()
}

pub fn user(name: &str) -> Value {
    json!({ "user": { "name": name } })
}

/// A request as seen by the raw backend.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw HTTP response: status, extra headers, body.
pub type RawResponse = (u16, Vec<(String, String)>, String);

/// Start a programmable HTTP/1.1 backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RawRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RawResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, headers, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let mut response = format!("HTTP/1.1 {}\r\n", status_text);
                        for (name, value) in headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str(&format!(
                            "Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        ));
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RawRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RawRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Start a backend that answers every request with the given raw bytes and
/// then closes the connection, whatever the bytes claim.
pub async fn start_raw_backend(raw: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_none() {
                    return;
                }
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
