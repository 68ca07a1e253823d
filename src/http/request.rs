//! Request capture.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Keep generated IDs out of the forwarded headers
//! - Buffer the complete inbound body as opaque bytes
//! - Snapshot method, path+query and headers for the forwarding engine
//!
//! # Design Decisions
//! - No content-type aware parsing; JSON, multipart and binary are all bytes
//! - The body is fully buffered before forwarding so the upstream call
//!   carries a definite length
//! - An empty body is captured as empty bytes, never as "absent"

use axum::{
    body::{self, Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ProxyError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyRequestId;

impl MakeRequestId for ProxyRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Whether the caller sent its own `x-request-id`.
///
/// Inserted before `SetRequestIdLayer` runs, so capture can tell a
/// caller-supplied ID from one the proxy generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerRequestId(pub bool);

/// Record whether the inbound request already carried an ID.
pub async fn mark_caller_request_id(mut request: Request<Body>, next: Next) -> Response {
    let present = request.headers().contains_key(X_REQUEST_ID);
    request.extensions_mut().insert(CallerRequestId(present));
    next.run(request).await
}

/// Immutable record of an inbound request.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    method: Method,
    path_and_query: String,
    headers: HeaderMap,
    body: Bytes,
    request_id: String,
}

impl RequestSnapshot {
    /// Build a snapshot from already-buffered parts.
    pub fn new(method: Method, path_and_query: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        let request_id = header_str(&headers, X_REQUEST_ID).unwrap_or("unknown").to_string();
        Self {
            method,
            path_and_query: path_and_query.into(),
            headers,
            body,
            request_id,
        }
    }

    /// Consume the live request, reading at most `limit` body bytes.
    ///
    /// A stream error or an oversized body fails the capture; nothing is
    /// forwarded in that case.
    pub async fn capture(request: Request<Body>, limit: usize) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();

        let body = body::to_bytes(body, limit).await.map_err(|e| {
            tracing::warn!(error = %e, limit, "Failed to read request body");
            ProxyError::Capture(e.to_string())
        })?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let request_id = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .map(str::to_string);

        let mut headers = parts.headers;
        if parts.extensions.get::<CallerRequestId>() == Some(&CallerRequestId(false)) {
            headers.remove(X_REQUEST_ID);
        }

        let mut snapshot = Self::new(parts.method, path_and_query, headers, body);
        if let Some(id) = request_id {
            snapshot.request_id = id;
        }
        Ok(snapshot)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Original path and query string, untouched.
    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes; empty when the caller sent none.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, header::CONTENT_TYPE.as_str())
    }

    /// Correlation ID for logs, generated or caller-supplied.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
