//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `gateway` - Forwards charges to the payment gateway (server side, holds credentials)
//! - `payments` - Creates PIX charges through the storefront's proxy
//! - `cep` - Resolves CEPs through `ViaCEP`, with an in-memory cache
//! - `checkout` - A customer's checkout session driving the stage machine

pub mod cep;
pub mod checkout;
pub mod gateway;
pub mod payments;

pub use cep::{AddressDirectory, CepClient, CepLookupError};
pub use checkout::{CheckoutError, CheckoutSession};
pub use gateway::{GatewayClient, GatewayError, GatewayReply};
pub use payments::{PaymentClient, PaymentError, PixGateway};
