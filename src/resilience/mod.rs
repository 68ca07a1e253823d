//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (optional connect/request deadlines on the client)
//!     → On 403: retries.rs (one more attempt without forwarding headers)
//! ```
//!
//! # Design Decisions
//! - Retries are bounded to a single extra attempt
//! - Transport errors surface immediately as 502

pub mod retries;
pub mod timeouts;

pub use retries::{Attempt, RejectionRetry};
