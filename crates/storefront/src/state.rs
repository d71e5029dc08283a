//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;
use vitrine_core::checkout::CartStore;

use crate::config::StorefrontConfig;
use crate::services::cep::{CepClient, CepLookupError};
use crate::services::checkout::{CheckoutError, CheckoutSession};
use crate::services::gateway::{GatewayClient, GatewayError};
use crate::services::payments::{PaymentClient, PaymentError};

/// Errors building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    CepDirectory(#[from] CepLookupError),

    #[error(transparent)]
    Payments(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Configuration is read once
/// at start-up and never re-read per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    gateway: GatewayClient,
    cep: CepClient,
    payments: PaymentClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, StateError> {
        let gateway = GatewayClient::new(config.gateway.clone())?;
        let cep = CepClient::from_config(config)?;
        let payments = PaymentClient::from_config(config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                gateway,
                cep,
                payments,
            }),
        })
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// The CEP directory client. Its cache is shared by every checkout.
    #[must_use]
    pub fn cep(&self) -> &CepClient {
        &self.inner.cep
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Open a checkout for `cart` on the configured directory and proxy.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` if the cart has no lines.
    pub fn open_checkout<C: CartStore>(
        &self,
        cart: C,
    ) -> Result<CheckoutSession<C, CepClient, PaymentClient>, CheckoutError> {
        CheckoutSession::open(cart, self.cep().clone(), self.payments().clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;
    use vitrine_core::checkout::CartLine;

    use super::*;

    fn state(vars: &[(&str, &str)]) -> AppState {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        AppState::new(&config).unwrap()
    }

    #[test]
    fn test_clients_follow_configuration() {
        let state = state(&[
            ("STOREFRONT_BASE_URL", "https://loja.example.com.br/"),
            ("CEP_DIRECTORY_URL", "http://127.0.0.1:8088/ws/"),
            ("PIX_GATEWAY_PRODUCT_ID", "prod-canonical"),
        ]);

        assert_eq!(
            state.payments().endpoint(),
            "https://loja.example.com.br/api/pix/charge"
        );
        assert_eq!(state.payments().product_id().as_str(), "prod-canonical");
        assert_eq!(state.cep().base_url(), "http://127.0.0.1:8088/ws");
    }

    #[test]
    fn test_defaults_without_overrides() {
        let state = state(&[]);
        assert_eq!(
            state.payments().endpoint(),
            "http://localhost:3000/api/pix/charge"
        );
        assert_eq!(state.payments().product_id().as_str(), "produto-loja");
        assert_eq!(state.cep().base_url(), "https://viacep.com.br/ws");
    }

    #[test]
    fn test_open_checkout() {
        let state = state(&[]);
        assert!(matches!(
            state.open_checkout(Vec::<CartLine>::new()),
            Err(CheckoutError::EmptyCart)
        ));

        let cart = vec![CartLine::new("vestido", "Vestido", Decimal::new(4950, 2), 1)];
        let session = state.open_checkout(cart).unwrap();
        assert_eq!(session.cart().len(), 1);
    }
}
