//! Resilient authenticated API client for the ride platform.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──▶ SessionStore ──▶ Pipeline::request ──▶ Transport (reqwest)
//!                  ▲                 │    ▲
//!                  │                 │    └── single-flight refresh, backoff
//!                  │                 ▼
//!              guard task ◀── SessionEvents (session expired, network down)
//! ```
//!
//! One `Pipeline` per actor (passenger, driver). Each owns its refresh state
//! and its event bus. Both share the process-wide `Connectivity` flag.

pub mod clients;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pipeline;
pub mod resilience;
pub mod routing;
pub mod session;

pub use clients::ApiClients;
pub use config::ClientConfig;
pub use http::{ApiResponse, RequestConfig, ReqwestTransport, Transport};
pub use pipeline::{ClassifiedError, ErrorKind, FailureClass, Pipeline};
pub use routing::Actor;
pub use session::{SessionEvent, SessionStore};
