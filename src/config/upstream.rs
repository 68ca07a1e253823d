//! The single forwarding target, resolved once at startup.

use crate::config::validation::{validate_upstream, ValidationError};

/// Immutable upstream base URL plus the hostname used for `Host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    base: String,
    hostname: String,
}

impl UpstreamTarget {
    /// Parse and validate a base URL such as `http://34.123.45.67`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let url = validate_upstream(value)?;
        let hostname = url.host_str().unwrap_or_default().to_string();
        Ok(Self {
            base: value.to_string(),
            hostname,
        })
    }

    /// Hostname without scheme or port.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Append an inbound path and query verbatim.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base, path_and_query)
    }
}
