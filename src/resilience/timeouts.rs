//! Upstream client timeouts.
//!
//! Nothing is bounded unless configured; an unset timeout leaves the
//! connection to the OS and the upstream.

use std::time::Duration;

use crate::config::TimeoutConfig;

/// Apply configured timeouts to an upstream client builder.
pub fn apply(builder: reqwest::ClientBuilder, config: &TimeoutConfig) -> reqwest::ClientBuilder {
    let mut builder = builder;
    if let Some(secs) = config.connect_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.request_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
}
