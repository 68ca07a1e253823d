//! CORS middleware.
//! Adds cross-origin headers to every response and answers preflights.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::CorsConfig;

pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";

/// `OPTIONS` requests stop here with 204 and never reach the upstream.
pub async fn cors_middleware(
    State(cors): State<Arc<CorsConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(&cors, origin.as_ref(), response.headers_mut());
    response
}

/// Set CORS headers the upstream did not already provide.
pub fn apply_cors_headers(cors: &CorsConfig, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
    let origin_str = origin.and_then(|o| o.to_str().ok()).unwrap_or("");

    if cors.allows(origin_str) {
        let allow_origin = match origin {
            Some(value) if !origin_str.is_empty() => value.clone(),
            _ => HeaderValue::from_static("*"),
        };
        headers
            .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .or_insert(allow_origin);
        headers
            .entry(header::VARY)
            .or_insert(HeaderValue::from_static("Origin"));
    }

    headers
        .entry(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(ALLOW_HEADERS));
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_METHODS)
        .or_insert(HeaderValue::from_static(ALLOW_METHODS));
}
