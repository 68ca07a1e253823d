//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, caller ID marker, request ID, tracing)
//!     → middleware/cors.rs (CORS headers, OPTIONS short-circuit)
//!     → request.rs (capture method, path+query, headers, raw body)
//!     → forwarding engine (upstream call, 403 retry)
//!     → response.rs (relay or JSON error envelope)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CallerRequestId, ProxyRequestId, RequestSnapshot, X_REQUEST_ID};
pub use response::{ProxyError, RelayedResponse};
pub use server::HttpServer;
