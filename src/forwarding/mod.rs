//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSnapshot (http/request.rs)
//!     → headers.rs (exclusions, Host pin, User-Agent fallback)
//!     → engine.rs (URL, body selection, upstream call)
//!     → on 403: resilience/retries.rs decides the single retry
//!     → headers.rs (response header relay filter)
//!     → RelayedResponse or ProxyError (http/response.rs)
//! ```
//!
//! # Design Decisions
//! - No state is kept between requests; the engine only holds the client
//!   and the immutable upstream target
//! - The upstream call owns the request future, so a caller disconnect
//!   drops (aborts) the in-flight upstream call

pub mod engine;
pub mod headers;

pub use engine::{select_body, ForwardingEngine};
