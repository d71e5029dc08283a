//! Checkout domain: everything between "cart" and "paid".
//!
//! # Flow
//!
//! ```text
//! form ──submit──▶ payment_processing ──pix ready──▶ pix_screen ──paid──▶ success
//!  ▲                 │        │
//!  └──payment failed─┘        └──card declined──▶ payment_error
//!                                                   │
//!                  payment_processing ◀──retry pix──┘
//! ```
//!
//! The pieces here are pure. The storefront's checkout service owns the
//! network calls and feeds their outcomes into [`stage::transition`] and
//! [`address::AddressResolver`].

pub mod address;
pub mod cart;
pub mod customer;
pub mod shipping;
pub mod stage;
pub mod validation;

pub use address::{Address, AddressResolver, LookupOutcome, LookupTicket, ResolvedAddress};
pub use cart::{CartLine, CartStore, subtotal};
pub use customer::{CardForm, CustomerForm};
pub use shipping::{OrderTotals, ShippingMethod, ShippingOption, order_totals, shipping_cost};
pub use stage::{CheckoutEvent, CheckoutStage, CheckoutState, TransitionError, transition};
pub use validation::{ValidationError, validate_form};
