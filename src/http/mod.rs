//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! RequestConfig (caller)
//!     → request.rs (resolve into PendingRequest, request ID)
//!     → transport.rs (reqwest, cookies, JSON bodies)
//!     → TransportResponse | TransportError { status, data: { code, message } }
//!     → response.rs (ApiResponse handed back to caller)
//! ```

pub mod request;
pub mod response;
pub mod transport;

pub use request::{PendingRequest, RequestConfig, X_REQUEST_ID};
pub use response::ApiResponse;
pub use transport::{
    ErrorData, ErrorResponse, ReqwestTransport, Transport, TransportError, TransportResponse,
};
