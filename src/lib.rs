//! Transparent HTTP edge proxy library.
//!
//! Forwards every request to a single configured upstream and relays the
//! reply, with CORS handling and a one-shot retry on upstream 403.

pub mod config;
pub mod forwarding;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use forwarding::ForwardingEngine;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
