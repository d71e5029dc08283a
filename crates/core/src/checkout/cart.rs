//! Cart lines as seen by checkout.
//!
//! Cart persistence belongs to another component; checkout only reads the
//! lines and clears the cart once the customer confirms payment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price after discounts.
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The cart collaborator checkout talks to.
pub trait CartStore {
    /// Current cart lines.
    fn lines(&self) -> &[CartLine];

    /// Remove every line. Called once payment is confirmed.
    fn clear(&mut self);

    /// Returns true if the cart has no lines.
    fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

impl CartStore for Vec<CartLine> {
    fn lines(&self) -> &[CartLine] {
        self
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Sum of `unit_price × quantity` over all lines.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}
