//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base URL of the single upstream (e.g., "http://10.0.0.7").
    ///
    /// Left unset, the proxy still starts but answers every request with 500.
    pub upstream: Option<String>,

    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Cross-origin response headers.
    pub cors: CorsConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Upstream client timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to read responses. A single `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Whether every origin is allowed.
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Whether the given request origin may be reflected.
    pub fn allows(&self, origin: &str) -> bool {
        self.is_wildcard() || self.allowed_origins.iter().any(|o| o == origin)
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Limits applied while capturing the inbound request.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body in bytes. Unset buffers any size.
    pub max_body_bytes: Option<usize>,
}

impl LimitsConfig {
    /// Limit handed to the body reader.
    pub fn body_limit(&self) -> usize {
        self.max_body_bytes.unwrap_or(usize::MAX)
    }
}

/// Timeouts for calls to the upstream.
///
/// Both are unset by default, leaving the OS and peer to bound latency.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Total time for one upstream request/response in seconds.
    pub request_secs: Option<u64>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. Metrics are disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8080_without_upstream() {
        let config = ProxyConfig::default();
        assert!(config.upstream.is_none());
        assert_eq!(config.listener.bind_address(), "0.0.0.0:8080");
        assert!(config.cors.is_wildcard());
        assert!(config.timeouts.request_secs.is_none());
        assert!(config.limits.max_body_bytes.is_none());
        assert_eq!(config.limits.body_limit(), usize::MAX);
    }

    #[test]
    fn partial_toml_keeps_section_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            upstream = "http://10.0.0.7"

            [listener]
            port = 9000

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.as_deref(), Some("http://10.0.0.7"));
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn cors_allow_list() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://app.example.com".into()],
        };
        assert!(!cors.is_wildcard());
        assert!(cors.allows("https://app.example.com"));
        assert!(!cors.allows("https://evil.example.com"));
    }
}
