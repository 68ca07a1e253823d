//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Upstream base URL.
pub const ENV_UPSTREAM: &str = "UPSTREAM";
/// Listen port.
pub const ENV_PORT: &str = "PORT";
/// Comma-separated CORS allow list.
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
/// Total upstream request timeout in seconds.
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
/// Prometheus listener address.
pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config: ProxyConfig = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values on top of file/default configuration.
///
/// Empty values count as unset, so `UPSTREAM=` leaves the upstream missing.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(upstream) = get(ENV_UPSTREAM) {
        config.upstream = Some(upstream);
    }

    if let Some(port) = get(ENV_PORT) {
        config.listener.port = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            var: ENV_PORT,
            reason: e.to_string(),
        })?;
    }

    if let Some(origins) = get(ENV_ALLOWED_ORIGINS) {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(secs) = get(ENV_UPSTREAM_TIMEOUT_SECS) {
        let secs = secs.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            var: ENV_UPSTREAM_TIMEOUT_SECS,
            reason: e.to_string(),
        })?;
        config.timeouts.request_secs = Some(secs);
    }

    if let Some(addr) = get(ENV_METRICS_ADDR) {
        config.observability.metrics_address = Some(addr);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_upstream_and_port() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("UPSTREAM", "http://34.123.45.67"), ("PORT", "3000")]),
        )
        .unwrap();

        assert_eq!(config.upstream.as_deref(), Some("http://34.123.45.67"));
        assert_eq!(config.listener.port, 3000);
    }

    #[test]
    fn empty_upstream_counts_as_unset() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, env(&[("UPSTREAM", "")])).unwrap();
        assert!(config.upstream.is_none());
    }

    #[test]
    fn port_defaults_to_8080() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config.listener.port, 8080);
    }

    #[test]
    fn bad_port_is_reported() {
        let mut config = ProxyConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn origins_split_on_commas() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("ALLOWED_ORIGINS", "https://a.example, https://b.example,")]),
        )
        .unwrap();
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
