//! Forwarding engine: one snapshot in, one caller-visible response out.
//!
//! ```text
//! FORWARDING ──(status != 403)──────────────────────────▶ DONE (relay)
//!     │
//!     └─(403)─▶ FORWARDING_RETRY ──(status != 403)──────▶ DONE (relay retry)
//!                      └──(403 or transport error)──────▶ DONE (403 diagnostic)
//! ```

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

use crate::config::{ProxyConfig, UpstreamTarget};
use crate::forwarding::headers::{
    outbound_headers, relay_headers, retry_headers, EXCLUDED_RESPONSE_HEADERS,
    EXCLUDED_RETRY_RESPONSE_HEADERS,
};
use crate::http::request::RequestSnapshot;
use crate::http::response::{ProxyError, RelayedResponse};
use crate::observability::metrics;
use crate::resilience::{timeouts, Attempt, RejectionRetry};

/// Methods that never carry a body upstream.
const BODYLESS_METHODS: &[Method] = &[Method::GET, Method::HEAD, Method::OPTIONS];

/// Body to send upstream, if any.
///
/// `GET`, `HEAD` and `OPTIONS` never send one; other methods send the
/// captured bytes unless they are empty.
pub fn select_body(method: &Method, body: &Bytes) -> Option<Bytes> {
    if BODYLESS_METHODS.contains(method) || body.is_empty() {
        None
    } else {
        Some(body.clone())
    }
}

/// Stateless request forwarder bound to a single upstream.
#[derive(Debug, Clone)]
pub struct ForwardingEngine {
    client: reqwest::Client,
    target: Option<UpstreamTarget>,
    retry: RejectionRetry,
}

impl ForwardingEngine {
    /// Engine over an existing client.
    pub fn new(client: reqwest::Client, target: Option<UpstreamTarget>) -> Self {
        Self {
            client,
            target,
            retry: RejectionRetry::default(),
        }
    }

    /// Build the upstream client and resolve the target from configuration.
    ///
    /// The client follows redirects, decompresses bodies and ignores
    /// system proxy settings.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, crate::lifecycle::StartupError> {
        let target = config
            .upstream
            .as_deref()
            .map(UpstreamTarget::parse)
            .transpose()?;

        let builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .no_proxy();
        let client = timeouts::apply(builder, &config.timeouts).build()?;

        Ok(Self::new(client, target))
    }

    /// Configured upstream, or the per-request configuration error.
    pub fn target(&self) -> Result<&UpstreamTarget, ProxyError> {
        self.target.as_ref().ok_or(ProxyError::UpstreamNotSet)
    }

    /// Forward a captured request, applying the one-shot rejection retry.
    pub async fn forward(&self, snapshot: &RequestSnapshot) -> Result<RelayedResponse, ProxyError> {
        let target = self.target()?;
        let url = target.url_for(snapshot.path_and_query());
        let headers = outbound_headers(snapshot.headers(), target);
        let body = select_body(snapshot.method(), snapshot.body());

        tracing::info!(
            request_id = %snapshot.request_id(),
            method = %snapshot.method(),
            path = %snapshot.path_and_query(),
            upstream_url = %url,
            content_type = snapshot.content_type().unwrap_or("none"),
            body_size = snapshot.body().len(),
            "Proxying request"
        );

        let first = self
            .send(snapshot.method(), &url, headers.clone(), body.clone())
            .await
            .map_err(|e| {
                tracing::error!(request_id = %snapshot.request_id(), upstream_url = %url, error = %e, "Upstream error");
                metrics::record_upstream_error();
                ProxyError::Upstream(e.to_string())
            })?;

        let status = first.status();
        tracing::info!(request_id = %snapshot.request_id(), status = %status, "Upstream responded");
        tracing::debug!(headers = ?first.headers(), "Upstream response headers");

        if self.retry.next_attempt(Attempt::Initial, status).is_none() {
            return relay(first, EXCLUDED_RESPONSE_HEADERS).await;
        }

        let detail = first.text().await.ok().filter(|text| !text.is_empty());
        tracing::warn!(
            request_id = %snapshot.request_id(),
            upstream_url = %url,
            sent_headers = ?headers,
            upstream_body = detail.as_deref().unwrap_or(""),
            "Upstream rejected request, retrying without forwarding headers"
        );

        match self.retry_once(snapshot, &url, &headers, body).await {
            Some(response) => Ok(response),
            None => Err(ProxyError::Rejected {
                upstream_url: url,
                detail,
            }),
        }
    }

    /// The single retry; `None` means the rejection stands.
    async fn retry_once(
        &self,
        snapshot: &RequestSnapshot,
        url: &str,
        headers: &HeaderMap,
        body: Option<Bytes>,
    ) -> Option<RelayedResponse> {
        let response = match self.send(snapshot.method(), url, retry_headers(headers), body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(request_id = %snapshot.request_id(), error = %e, "Retry failed");
                metrics::record_retry("error");
                return None;
            }
        };

        let status = response.status();
        if self.retry.is_rejection(status) {
            tracing::warn!(request_id = %snapshot.request_id(), status = %status, "Retry rejected again");
            metrics::record_retry("rejected");
            return None;
        }

        match relay(response, EXCLUDED_RETRY_RESPONSE_HEADERS).await {
            Ok(relayed) => {
                tracing::info!(request_id = %snapshot.request_id(), status = %status, "Retry succeeded");
                metrics::record_retry("succeeded");
                Some(relayed)
            }
            Err(e) => {
                tracing::error!(request_id = %snapshot.request_id(), error = %e, "Retry failed");
                metrics::record_retry("error");
                None
            }
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self.client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        request.send().await
    }
}

/// Read the upstream body and pair it with filtered headers.
async fn relay(response: reqwest::Response, excluded: &[&str]) -> Result<RelayedResponse, ProxyError> {
    let status = response.status();
    // reqwest drops content-length itself when it decompresses the body.
    let headers = relay_headers(response.headers(), excluded);
    let body = response.bytes().await.map_err(|e| {
        metrics::record_upstream_error();
        ProxyError::Upstream(e.to_string())
    })?;

    Ok(RelayedResponse { status, headers, body })
}
