//! Vitrine Core - Checkout domain library.
//!
//! This crate provides the checkout logic shared by the Vitrine components:
//! - `storefront` - Public-facing checkout service and PIX charge proxy
//! - `integration-tests` - End-to-end tests against in-process servers
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no I/O,
//! no HTTP clients, no clocks. Anything that talks to the network (the
//! payment gateway, the postal-code directory) lives in the storefront crate
//! and feeds its results back into the types defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for identifiers (CPF, CEP, phone, email), ids,
//!   prices and input masks
//! - [`checkout`] - Cart totals, shipping, address resolution, validation
//!   gate and the checkout stage machine
//! - [`pix`] - Charge request/response envelopes and PIX payload extraction

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod pix;
pub mod types;

pub use types::*;
