//! Permissive CORS headers for the charge endpoint.
//!
//! The checkout may be served from a different origin than the proxy, so
//! every response (errors and preflights included) carries the same headers.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    middleware::Next,
    response::Response,
};

/// Add CORS headers to all responses.
///
/// Headers applied:
/// - `Access-Control-Allow-Origin: *`
/// - `Access-Control-Allow-Methods: POST, OPTIONS`
/// - `Access-Control-Allow-Headers: Content-Type`
pub async fn cors_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );

    response
}
