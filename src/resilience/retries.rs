//! Rejection retry policy.
//!
//! # Responsibilities
//! - Decide whether an upstream status earns a second attempt
//! - Bound the policy to exactly one extra attempt per request
//!
//! # Design Decisions
//! - Only the configured rejection status (403) is retried; every other
//!   status, including 5xx, is relayed as-is
//! - Transport failures on the first attempt are never retried
//! - The retry's own outcome never triggers another attempt

use axum::http::StatusCode;

/// Which upstream call of a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retry,
}

/// One-shot retry on a specific upstream rejection status.
#[derive(Debug, Clone, Copy)]
pub struct RejectionRetry {
    status: StatusCode,
}

impl RejectionRetry {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// Whether `status` is the rejection this policy reacts to.
    pub fn is_rejection(&self, status: StatusCode) -> bool {
        status == self.status
    }

    /// The attempt to make after `attempt` returned `status`, if any.
    pub fn next_attempt(&self, attempt: Attempt, status: StatusCode) -> Option<Attempt> {
        match attempt {
            Attempt::Initial if self.is_rejection(status) => Some(Attempt::Retry),
            _ => None,
        }
    }
}

impl Default for RejectionRetry {
    fn default() -> Self {
        Self::new(StatusCode::FORBIDDEN)
    }
}
