// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response header middleware: security headers and caching policy.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Bundled data files change only on deploy; match the client cache TTL.
const DATA_CACHE_CONTROL: &str = "public, max-age=300";

/// Add security headers to all responses.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

/// Static data may be cached briefly; API answers must be revalidated so a
/// stale-data reload sees fresh records.
pub async fn cache_control(req: Request, next: Next) -> Response {
    let is_data = req.uri().path().starts_with("/data/");
    let mut response = next.run(req).await;

    if !response.status().is_success() {
        return response;
    }
    let value = if is_data {
        HeaderValue::from_static(DATA_CACHE_CONTROL)
    } else {
        HeaderValue::from_static("no-cache")
    };
    response.headers_mut().insert(header::CACHE_CONTROL, value);
    response
}
