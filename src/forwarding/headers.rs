//! Header filtering and rewriting for both directions of the proxy.
//!
//! `HeaderMap` is the ordered, case-insensitive multi-map used throughout:
//! names are stored lowercased, so every exclusion check below is
//! case-insensitive regardless of the casing the peer sent.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::UpstreamTarget;

/// Inbound headers never sent to the upstream.
pub const EXCLUDED_REQUEST_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "upgrade",
    "transfer-encoding",
    "x-forwarded-for",
    "x-forwarded-proto",
    "x-forwarded-host",
];

/// Upstream response headers never relayed to the caller.
pub const EXCLUDED_RESPONSE_HEADERS: &[&str] =
    &["connection", "transfer-encoding", "content-encoding", "location"];

/// Relay exclusions for a successful rejection retry; `location` passes through.
pub const EXCLUDED_RETRY_RESPONSE_HEADERS: &[&str] =
    &["connection", "transfer-encoding", "content-encoding"];

/// Proxy bookkeeping headers stripped from a rejection retry.
pub const FORWARDED_HEADERS: &[&str] = &["x-forwarded-for", "x-forwarded-proto", "x-forwarded-host"];

/// Sent when the caller did not identify itself.
pub const FALLBACK_USER_AGENT: &str =
    concat!("Mozilla/5.0 (compatible; edge-proxy/", env!("CARGO_PKG_VERSION"), ")");

fn is_listed(name: &HeaderName, list: &[&str]) -> bool {
    list.contains(&name.as_str())
}

/// Build the header set for the first upstream attempt.
///
/// Drops hop-by-hop and forwarding headers, pins `Host` to the upstream
/// hostname and fills in a `User-Agent` when the caller sent none. No
/// `X-Forwarded-*` headers are added.
pub fn outbound_headers(inbound: &HeaderMap, target: &UpstreamTarget) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);

    for (name, value) in inbound {
        if is_listed(name, EXCLUDED_REQUEST_HEADERS) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    match HeaderValue::from_str(target.hostname()) {
        Ok(host) => {
            headers.insert(header::HOST, host);
        }
        Err(e) => {
            tracing::warn!(hostname = %target.hostname(), error = %e, "Upstream hostname is not a valid Host value");
        }
    }

    if !headers.contains_key(header::USER_AGENT) {
        headers.insert(header::USER_AGENT, HeaderValue::from_static(FALLBACK_USER_AGENT));
    }

    headers
}

/// Header set for the single retry after an upstream rejection.
pub fn retry_headers(outbound: &HeaderMap) -> HeaderMap {
    let mut headers = outbound.clone();
    for name in FORWARDED_HEADERS {
        headers.remove(*name);
    }
    headers
}

/// Copy upstream response headers, skipping `excluded`.
///
/// Repeated names (e.g. several `set-cookie`) are kept in the order received.
pub fn relay_headers(upstream: &HeaderMap, excluded: &[&str]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if is_listed(name, excluded) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
