//! Checkout-side payment client.
//!
//! Builds the charge request from the checkout form and posts it to the
//! storefront's own charge proxy, which holds the gateway credentials.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;
use vitrine_core::ProductId;
use vitrine_core::checkout::CustomerForm;
use vitrine_core::pix::{ChargeRequest, ChargeResponse};

use crate::config::StorefrontConfig;

/// Item id sent when the proxy does not force a canonical one.
pub const DEFAULT_PRODUCT_ID: &str = "produto-loja";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when creating a charge.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy answered with something that is not JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Something that can create PIX charges.
pub trait PixGateway: Send + Sync {
    /// Create a charge of `amount` centavos for `customer`.
    ///
    /// A rejected charge is an `Ok` response with `success: false`; `Err`
    /// means no usable answer arrived at all.
    fn create_charge(
        &self,
        customer: &CustomerForm,
        amount: i64,
    ) -> impl Future<Output = Result<ChargeResponse, PaymentError>> + Send;
}

/// HTTP client for the charge proxy.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    endpoint: String,
    product_id: ProductId,
}

impl PaymentClient {
    /// Create a client for the storefront at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let endpoint = format!(
            "{}/api/pix/charge",
            base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            product_id: ProductId::new(DEFAULT_PRODUCT_ID),
        })
    }

    /// Use `product_id` as the charged item's id.
    #[must_use]
    pub fn with_product_id(mut self, product_id: ProductId) -> Self {
        self.product_id = product_id;
        self
    }

    /// Client for this storefront's own proxy at `STOREFRONT_BASE_URL`.
    ///
    /// Charges carry the canonical product id when one is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, PaymentError> {
        let client = Self::new(&config.base_url)?;
        Ok(match &config.gateway.product_id {
            Some(product_id) => client.with_product_id(product_id.clone()),
            None => client,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }
}

impl PixGateway for PaymentClient {
    #[instrument(skip(self, customer))]
    async fn create_charge(
        &self,
        customer: &CustomerForm,
        amount: i64,
    ) -> Result<ChargeResponse, PaymentError> {
        let request = ChargeRequest::new(customer, amount, self.product_id.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, "pt_BR")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let charge: ChargeResponse = serde_json::from_str(&text)?;

        info!(status = %status, success = charge.success, "Charge request answered");
        Ok(charge)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_built_from_base_url() {
        let client = PaymentClient::new(&Url::parse("http://localhost:3000/").unwrap()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/pix/charge");
        assert_eq!(client.product_id.as_str(), DEFAULT_PRODUCT_ID);

        let client = client.with_product_id(ProductId::new("camiseta-01"));
        assert_eq!(client.product_id.as_str(), "camiseta-01");
    }
}
