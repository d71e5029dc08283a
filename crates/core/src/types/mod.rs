//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for the Brazilian identifiers
//! collected at checkout, plus the input masks applied on every keystroke.

pub mod cep;
pub mod cpf;
pub mod email;
pub mod id;
pub mod mask;
pub mod payment_method;
pub mod phone;
pub mod price;

pub use cep::{Cep, CepError};
pub use cpf::{Cpf, CpfError, validate_cpf};
pub use email::{Email, EmailError, validate_email};
pub use id::*;
pub use mask::*;
pub use payment_method::PaymentMethod;
pub use phone::{Phone, PhoneError, validate_phone};
pub use price::{CurrencyCode, Price, PriceError};
