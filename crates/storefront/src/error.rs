//! Unified error handling with Sentry integration.
//!
//! Every error leaves the storefront as the gateway's own failure envelope,
//! `{"success": false, "message": ...}`, so the checkout can treat proxy
//! failures and gateway rejections the same way. Server-side failures are
//! captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use vitrine_core::pix::ChargeResponse;

use crate::services::gateway::GatewayError;

/// Shown when gateway credentials are missing.
pub const GATEWAY_NOT_CONFIGURED: &str = "Erro de configuração do servidor de pagamentos.";

/// Shown when the gateway cannot be reached.
pub const GATEWAY_UNREACHABLE: &str =
    "Erro de conexão com o servidor de pagamentos. Tente novamente.";

/// Shown when the charge body cannot be parsed.
pub const INVALID_REQUEST: &str = "Requisição inválida.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Payment gateway forwarding failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Method other than POST or OPTIONS on the charge endpoint.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Gateway(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        };

        // Don't expose internal error details (such as which variable is missing)
        let message = match &self {
            Self::Gateway(GatewayError::NotConfigured(_)) => GATEWAY_NOT_CONFIGURED,
            Self::Gateway(GatewayError::Http(_)) => GATEWAY_UNREACHABLE,
            Self::BadRequest(_) => INVALID_REQUEST,
            Self::MethodNotAllowed => "Method not allowed",
        };

        (status, Json(ChargeResponse::failure(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("expected object".to_string());
        assert_eq!(err.to_string(), "Bad request: expected object");

        let err = AppError::from(GatewayError::NotConfigured(vec!["PIX_GATEWAY_TOKEN"]));
        assert_eq!(
            err.to_string(),
            "Gateway error: payment gateway is not configured (missing PIX_GATEWAY_TOKEN)"
        );
    }

    #[tokio::test]
    async fn test_not_configured_hides_variable_names() {
        let (status, body) = render(AppError::from(GatewayError::NotConfigured(vec![
            "PIX_GATEWAY_TOKEN",
            "PIX_GATEWAY_STORE_ID",
        ])))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"success": false, "message": GATEWAY_NOT_CONFIGURED})
        );
    }

    #[tokio::test]
    async fn test_client_errors() {
        let (status, body) = render(AppError::MethodNotAllowed).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"success": false, "message": "Method not allowed"}));

        let (status, body) = render(AppError::BadRequest("eof".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], INVALID_REQUEST);
    }
}
