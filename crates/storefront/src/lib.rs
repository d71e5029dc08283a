//! Vitrine storefront library.
//!
//! The HTTP side of the PIX checkout: the charge proxy that keeps gateway
//! credentials server-side, plus the checkout session, payment client and
//! CEP directory client the checkout runs on. Exposed as a library so the
//! router can be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the full application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(middleware::cors_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::error::{GATEWAY_NOT_CONFIGURED, INVALID_REQUEST};

    fn state(vars: &[(&str, &str)]) -> AppState {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let config = StorefrontConfig::from_lookup(|key| {
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap();
        AppState::new(&config).unwrap()
    }

    fn configured() -> AppState {
        state(&[
            ("PIX_GATEWAY_URL", "http://127.0.0.1:1"),
            ("PIX_GATEWAY_TOKEN", "fk_live_8Qz3Lm0vR7tYw2Nc5Hd9Jp4K"),
            ("PIX_GATEWAY_STORE_ID", "store-42"),
        ])
    }

    fn charge_request(method: Method, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/api/pix/charge")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &axum::response::Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(state(&[]))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let response = app(state(&[]))
            .oneshot(charge_request(Method::POST, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert_eq!(
            json_body(response).await,
            json!({"success": false, "message": GATEWAY_NOT_CONFIGURED})
        );
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = app(state(&[]))
            .oneshot(charge_request(Method::OPTIONS, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let response = app(configured())
                .oneshot(charge_request(method, ""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_cors(&response);
            assert_eq!(
                json_body(response).await,
                json!({"success": false, "message": "Method not allowed"})
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let response = app(configured())
            .oneshot(charge_request(Method::POST, "name=maria"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_request_id_echoed_or_generated() {
        let request = Request::get("/health")
            .header(middleware::REQUEST_ID_HEADER, "req-123")
            .body(Body::empty())
            .unwrap();
        let response = app(state(&[])).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[middleware::REQUEST_ID_HEADER], "req-123");

        let response = app(state(&[]))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let generated = response.headers()[middleware::REQUEST_ID_HEADER]
            .to_str()
            .unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }
}
