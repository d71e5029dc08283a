//! Checkout session.
//!
//! Owns one customer's checkout: form state, address resolution, shipping,
//! and the stage machine from `vitrine_core::checkout`. Network calls happen
//! here; their outcomes are fed back into the pure transition function.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use vitrine_core::{Cpf, PaymentMethod};
use vitrine_core::checkout::customer::CPF_FIELD_ERROR;
use vitrine_core::checkout::{
    AddressResolver, CardForm, CartStore, CheckoutEvent, CheckoutState, CustomerForm,
    LookupOutcome, LookupTicket, OrderTotals, ShippingMethod, TransitionError, ValidationError,
    order_totals, transition, validate_form,
};
use vitrine_core::pix::{GENERIC_PAYMENT_ERROR, format_api_error};

use super::cep::AddressDirectory;
use super::payments::PixGateway;

/// How long the simulated card authorization takes before declining.
pub const CARD_DECLINE_DELAY: Duration = Duration::from_millis(2800);

/// How long the "copied" indicator stays on after copying the PIX code.
pub const COPIED_INDICATOR: Duration = Duration::from_secs(3);

/// Shown when the gateway accepted the charge but sent no usable PIX data.
pub const PIX_QR_ERROR: &str = "Erro ao processar QR Code PIX. Tente novamente.";

/// Shown when the charge request got no answer.
pub const PAYMENT_CONNECTION_ERROR: &str =
    "Erro de conexão com o servidor de pagamentos. Tente novamente em instantes.";

/// Errors returned by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout cannot start on an empty cart; send the customer back to the catalog.
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// A single customer's checkout.
pub struct CheckoutSession<C, D, G> {
    cart: C,
    directory: D,
    gateway: G,
    customer: CustomerForm,
    card: CardForm,
    address: AddressResolver,
    shipping: ShippingMethod,
    payment_method: PaymentMethod,
    state: CheckoutState,
    copied_at: Option<Instant>,
}

impl<C, D, G> CheckoutSession<C, D, G>
where
    C: CartStore,
    D: AddressDirectory,
    G: PixGateway,
{
    /// Open a checkout for `cart`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` if the cart has no lines.
    pub fn open(cart: C, directory: D, gateway: G) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            cart,
            directory,
            gateway,
            customer: CustomerForm::default(),
            card: CardForm::default(),
            address: AddressResolver::new(),
            shipping: ShippingMethod::default(),
            payment_method: PaymentMethod::default(),
            state: CheckoutState::new(),
            copied_at: None,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn cart(&self) -> &C {
        &self.cart
    }

    #[must_use]
    pub const fn customer(&self) -> &CustomerForm {
        &self.customer
    }

    pub const fn customer_mut(&mut self) -> &mut CustomerForm {
        &mut self.customer
    }

    #[must_use]
    pub const fn card(&self) -> &CardForm {
        &self.card
    }

    pub const fn card_mut(&mut self) -> &mut CardForm {
        &mut self.card
    }

    #[must_use]
    pub const fn address(&self) -> &AddressResolver {
        &self.address
    }

    pub fn set_address_street(&mut self, value: &str) {
        self.address.set_street(value);
    }

    pub fn set_address_neighborhood(&mut self, value: &str) {
        self.address.set_neighborhood(value);
    }

    pub fn set_address_city(&mut self, value: &str) {
        self.address.set_city(value);
    }

    pub fn set_address_state(&mut self, value: &str) {
        self.address.set_state(value);
    }

    pub fn set_address_number(&mut self, value: &str) {
        self.address.set_number(value);
    }

    pub fn set_address_complement(&mut self, value: &str) {
        self.address.set_complement(value);
    }

    // =========================================================================
    // Address
    // =========================================================================

    /// Record a CEP edit. See [`AddressResolver::set_cep`].
    pub fn set_cep(&mut self, input: &str) -> Option<LookupTicket> {
        self.address.set_cep(input)
    }

    /// Query the directory for a ticket's CEP without touching state.
    pub async fn lookup(&self, ticket: &LookupTicket) -> LookupOutcome {
        self.directory.lookup(ticket.cep()).await
    }

    /// Apply a lookup outcome. Returns `false` if a newer edit superseded it.
    pub fn apply_lookup(&mut self, ticket: &LookupTicket, outcome: LookupOutcome) -> bool {
        let applied = self.address.apply(ticket, outcome);
        if !applied {
            debug!(seq = ticket.seq(), "Discarded stale CEP lookup");
        }
        applied
    }

    /// Record a CEP edit and, if it completes a CEP, resolve it.
    pub async fn update_cep(&mut self, input: &str) {
        if let Some(ticket) = self.set_cep(input) {
            let outcome = self.lookup(&ticket).await;
            self.apply_lookup(&ticket, outcome);
        }
    }

    // =========================================================================
    // Shipping, payment method and totals
    // =========================================================================

    /// Select a shipping option. The choice survives address changes.
    pub const fn select_shipping(&mut self, method: ShippingMethod) {
        self.shipping = method;
    }

    #[must_use]
    pub const fn shipping(&self) -> ShippingMethod {
        self.shipping
    }

    /// Select how to pay. Ignored while a payment is in flight.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        if !self.state.is_processing() {
            self.payment_method = method;
        }
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Current subtotal, shipping and total.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        order_totals(self.cart.lines(), self.address.is_valid(), self.shipping)
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Run the validation gate and, if it passes, the selected payment.
    ///
    /// A failed gate keeps the form stage and sets exactly one message. PIX
    /// ends on the PIX screen or back on the form with a message; card ends
    /// on the payment error stage after [`CARD_DECLINE_DELAY`] without any
    /// gateway call.
    ///
    /// # Errors
    ///
    /// Returns a transition error if the current stage does not accept a
    /// submit (for example while a payment is already being processed).
    #[instrument(skip(self), fields(method = %self.payment_method))]
    pub async fn submit(&mut self) -> Result<&CheckoutState, CheckoutError> {
        if self.state.is_processing() {
            return Err(TransitionError::AlreadyProcessing.into());
        }

        if let Err(reason) = validate_form(&self.customer, self.address.is_valid()) {
            if reason == ValidationError::Cpf {
                self.customer.cpf_error = Some(CPF_FIELD_ERROR);
            }
            info!(field = reason.field(), "Checkout form rejected");
            self.apply(CheckoutEvent::SubmitRejected(reason))?;
            return Ok(&self.state);
        }

        let method = self.payment_method;
        self.apply(CheckoutEvent::Submit { method })?;

        match method {
            PaymentMethod::Pix => self.run_pix_charge().await?,
            PaymentMethod::Card => {
                tokio::time::sleep(CARD_DECLINE_DELAY).await;
                info!("Simulated card decline");
                self.apply(CheckoutEvent::CardDeclined)?;
            }
        }

        Ok(&self.state)
    }

    /// From the payment error stage, switch to PIX and charge.
    ///
    /// # Errors
    ///
    /// Returns a transition error outside the payment error stage.
    #[instrument(skip(self))]
    pub async fn retry_with_pix(&mut self) -> Result<&CheckoutState, CheckoutError> {
        self.apply(CheckoutEvent::RetryWithPix)?;
        self.payment_method = PaymentMethod::Pix;
        self.run_pix_charge().await?;
        Ok(&self.state)
    }

    async fn run_pix_charge(&mut self) -> Result<(), TransitionError> {
        let amount = match self.totals().total.to_minor_units() {
            Ok(amount) => amount,
            Err(e) => {
                error!(error = %e, "Order total cannot be charged");
                return self.apply(CheckoutEvent::PaymentFailed {
                    message: GENERIC_PAYMENT_ERROR.to_string(),
                });
            }
        };

        let event = match self.gateway.create_charge(&self.customer, amount).await {
            Ok(response) if response.success => match response.pix_data() {
                Some(pix) => {
                    let cpf = Cpf::parse(&self.customer.cpf)
                        .map(|cpf| cpf.redacted())
                        .unwrap_or_default();
                    info!(amount, cpf = %cpf, order_id = ?pix.order_id, "PIX charge created");
                    CheckoutEvent::PixReady(pix)
                }
                None => {
                    warn!(amount, "Charge succeeded without usable PIX data");
                    CheckoutEvent::PaymentFailed {
                        message: PIX_QR_ERROR.to_string(),
                    }
                }
            },
            Ok(response) => {
                let message = format_api_error(&response);
                warn!(amount, message = %message, "PIX charge rejected");
                CheckoutEvent::PaymentFailed { message }
            }
            Err(e) => {
                error!(amount, error = %e, "PIX charge request failed");
                CheckoutEvent::PaymentFailed {
                    message: PAYMENT_CONNECTION_ERROR.to_string(),
                }
            }
        };

        self.apply(event)
    }

    /// Copy the PIX code. Returns the code to put on the clipboard and turns
    /// on the "copied" indicator for [`COPIED_INDICATOR`].
    pub fn copy_pix_code(&mut self) -> Option<String> {
        let code = self.state.pix_data()?.qrcode_text.clone();
        self.copied_at = Some(Instant::now());
        Some(code)
    }

    /// True while the "copied" indicator is on.
    #[must_use]
    pub fn is_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_INDICATOR)
    }

    /// The customer says the PIX was paid: clear the cart and finish.
    ///
    /// There is no payment confirmation from the gateway.
    ///
    /// # Errors
    ///
    /// Returns a transition error outside the PIX screen.
    pub fn confirm_payment(&mut self) -> Result<&CheckoutState, CheckoutError> {
        let order_id = self.state.pix_data().and_then(|pix| pix.order_id.clone());
        self.apply(CheckoutEvent::PaymentConfirmed)?;
        self.cart.clear();
        self.copied_at = None;
        info!(order_id = ?order_id, "Checkout completed");
        Ok(&self.state)
    }

    /// Leave the checkout. A pending charge is left to expire at the gateway.
    pub fn reset(&mut self) {
        if let Some(order_id) = self.state.pix_data().and_then(|pix| pix.order_id.as_ref()) {
            info!(order_id = %order_id, "Checkout abandoned with a pending PIX charge");
        }
        self.state = CheckoutState::new();
        self.payment_method = PaymentMethod::default();
        self.copied_at = None;
    }

    fn apply(&mut self, event: CheckoutEvent) -> Result<(), TransitionError> {
        let from = self.state.stage().name();
        let event_name = event.name();
        self.state = transition(&self.state, event)?;
        debug!(from, event = event_name, to = self.state.stage().name(), "Checkout transition");
        Ok(())
    }
}
