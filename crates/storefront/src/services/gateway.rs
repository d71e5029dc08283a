//! Payment gateway forwarder behind the charge proxy.
//!
//! Holds the gateway credentials so they never reach the browser. Exactly one
//! outbound request is made per charge and nothing is retried: a retried
//! charge could bill the customer twice.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, instrument, warn};
use vitrine_core::ProductId;

use crate::config::GatewayConfig;

/// Message used when the gateway answers with an empty non-JSON body.
pub const INVALID_GATEWAY_RESPONSE: &str = "Resposta inválida do servidor de pagamentos.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when forwarding a charge.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Token or store id missing from the environment.
    #[error("payment gateway is not configured (missing {})", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The gateway's answer: its status code and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Client for the payment gateway's charge endpoint.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            inner: Arc::new(GatewayClientInner { client, config }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Forward a charge body to the gateway.
    ///
    /// When a canonical product id is configured, every item id is replaced
    /// with it first. The gateway's status code is returned unchanged; a body
    /// that is not JSON is wrapped in a failure envelope.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` without calling out if credentials are missing,
    /// and `Http` if the gateway cannot be reached or the body cannot be read.
    #[instrument(skip(self, body))]
    pub async fn forward_charge(&self, mut body: Value) -> Result<GatewayReply, GatewayError> {
        let config = &self.inner.config;
        let Some((token, store_id)) = config.credentials() else {
            return Err(GatewayError::NotConfigured(config.missing()));
        };

        if let Some(product_id) = &config.product_id {
            override_item_ids(&mut body, product_id);
        }

        let response = self
            .inner
            .client
            .post(config.charge_url())
            .bearer_auth(token.expose_secret())
            .header("Store-Id", store_id)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, "pt_BR")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let body = serde_json::from_str(&text).unwrap_or_else(|_| {
            warn!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Gateway returned a non-JSON body"
            );
            non_json_envelope(&text)
        });

        info!(status = %status, "Gateway answered charge request");
        Ok(GatewayReply { status, body })
    }
}

/// Replace the `id` of every object in `body.items` with `product_id`.
pub fn override_item_ids(body: &mut Value, product_id: &ProductId) {
    let Some(items) = body.get_mut("items").and_then(Value::as_array_mut) else {
        return;
    };
    for item in items.iter_mut().filter_map(Value::as_object_mut) {
        item.insert(
            "id".to_string(),
            Value::String(product_id.as_str().to_owned()),
        );
    }
}

/// Failure envelope carrying a non-JSON gateway body as its message.
#[must_use]
pub fn non_json_envelope(text: &str) -> Value {
    let message = if text.trim().is_empty() {
        INVALID_GATEWAY_RESPONSE
    } else {
        text
    };
    json!({"success": false, "message": message})
}
