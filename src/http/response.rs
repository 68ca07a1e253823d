//! Response handling.
//!
//! # Responsibilities
//! - Turn a relayed upstream reply into the caller-visible response
//! - Map proxy-level failures to status codes and JSON envelopes
//!
//! # Design Decisions
//! - Upstream statuses, including 4xx/5xx, are relayed, not treated as errors
//! - The proxy itself only ever produces 500, 502 or 403
//! - Upstream bodies are relayed byte-for-byte

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Hint attached to a rejection that survived the retry.
pub const REJECTION_HINT: &str =
    "The upstream gateway is rejecting the request. Check gateway configuration.";

/// Detail used when the rejecting upstream sent no readable body.
pub const NO_UPSTREAM_DETAIL: &str = "No detail from upstream";

/// Failures reported by the proxy itself.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No upstream target configured.
    #[error("UPSTREAM not set")]
    UpstreamNotSet,

    /// The inbound body could not be read.
    #[error("request body could not be read: {0}")]
    Capture(String),

    /// The upstream call failed at the transport level.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The upstream answered 403 to both the request and its retry.
    #[error("upstream rejected {upstream_url}")]
    Rejected {
        upstream_url: String,
        detail: Option<String>,
    },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamNotSet => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Capture(_) | ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Rejected { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ProxyError::UpstreamNotSet => json!({ "error": "UPSTREAM not set" }),
            ProxyError::Capture(detail) | ProxyError::Upstream(detail) => json!({
                "error": "Upstream error",
                "detail": detail,
            }),
            ProxyError::Rejected { upstream_url, detail } => json!({
                "error": "Forbidden from upstream",
                "upstream_url": upstream_url,
                "detail": detail.unwrap_or_else(|| NO_UPSTREAM_DETAIL.to_string()),
                "message": REJECTION_HINT,
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Upstream reply ready to be sent back to the caller.
#[derive(Debug, Clone)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_upstream_is_500() {
        let response = ProxyError::UpstreamNotSet.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "UPSTREAM not set" }));
    }

    #[tokio::test]
    async fn transport_error_is_502() {
        let response = ProxyError::Upstream("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Upstream error");
        assert_eq!(body["detail"], "connection refused");
    }

    #[tokio::test]
    async fn capture_failure_shares_the_502_envelope() {
        let response = ProxyError::Capture("stream reset".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "error": "Upstream error", "detail": "stream reset" }));
    }

    #[tokio::test]
    async fn rejection_carries_diagnostics() {
        let response = ProxyError::Rejected {
            upstream_url: "http://10.0.0.7/orders".into(),
            detail: None,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["upstream_url"], "http://10.0.0.7/orders");
        assert_eq!(body["detail"], NO_UPSTREAM_DETAIL);
        assert_eq!(body["message"], REJECTION_HINT);
    }

    #[tokio::test]
    async fn relayed_response_keeps_status_headers_and_bytes() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", "a=1".parse().unwrap());
        headers.append("set-cookie", "b=2".parse().unwrap());

        let response = RelayedResponse {
            status: StatusCode::IM_A_TEAPOT,
            headers,
            body: Bytes::from_static(b"\x00\x01short and stout"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\x00\x01short and stout");
    }
}
