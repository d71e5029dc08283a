//! PIX charge proxy.
//!
//! The checkout posts its charge request here; the proxy adds the gateway
//! credentials and forwards it. Gateway answers, rejections included, are
//! passed back with their original status code.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::gateway::GatewayError;
use crate::state::AppState;

/// `POST /api/pix/charge`
///
/// # Errors
///
/// - 500 with a configuration message if gateway credentials are missing
/// - 400 if the body is neither a JSON object nor a JSON string holding one
/// - 500 with a connection message if the gateway cannot be reached
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn create_charge(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let gateway = state.gateway();
    if gateway.config().credentials().is_none() {
        return Err(GatewayError::NotConfigured(gateway.config().missing()).into());
    }

    let charge = parse_charge_body(&body)?;
    let reply = gateway.forward_charge(charge).await?;

    Ok((reply.status, Json(reply.body)).into_response())
}

/// `OPTIONS /api/pix/charge` (CORS preflight).
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on `/api/pix/charge`.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Parse a charge body sent either as a JSON object or as a JSON string
/// whose content is the object.
///
/// # Errors
///
/// Returns `BadRequest` for anything else.
pub fn parse_charge_body(bytes: &[u8]) -> Result<Value> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let value = match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|e| AppError::BadRequest(e.to_string()))?
        }
        other => other,
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(AppError::BadRequest("expected a JSON object".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_object() {
        let body = parse_charge_body(br#"{"amount": 100, "items": []}"#).unwrap();
        assert_eq!(body, json!({"amount": 100, "items": []}));
    }

    #[test]
    fn test_parse_string_wrapped_object() {
        let wrapped = serde_json::to_vec(&json!(r#"{"amount": 100}"#)).unwrap();
        assert_eq!(parse_charge_body(&wrapped).unwrap(), json!({"amount": 100}));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        let cases: [&[u8]; 5] = [b"", b"not json", b"[1, 2]", br#""[1]""#, b"42"];
        for raw in cases {
            assert!(matches!(
                parse_charge_body(raw),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
