//! Shipping options and order totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{CartLine, subtotal};
use crate::types::Price;

/// The fixed menu of shipping methods, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Free standard delivery (Correios).
    #[default]
    Standard,
    /// Paid express delivery (Sedex).
    Express,
}

impl ShippingMethod {
    /// All methods in display order. The first one is the default.
    pub const ALL: [Self; 2] = [Self::Standard, Self::Express];

    /// Stable identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }

    /// Customer-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "Entrega Padrão (Correios)",
            Self::Express => "Entrega Expressa (Sedex)",
        }
    }

    /// Price in reais.
    #[must_use]
    pub fn price(self) -> Decimal {
        match self {
            Self::Standard => Decimal::ZERO,
            Self::Express => Decimal::new(1973, 2),
        }
    }

    /// Delivery lead time.
    #[must_use]
    pub const fn lead_time(self) -> &'static str {
        match self {
            Self::Standard => "7-10 dias úteis",
            Self::Express => "2-3 dias úteis",
        }
    }

    /// Full description of this method.
    #[must_use]
    pub fn option(self) -> ShippingOption {
        ShippingOption {
            id: self,
            name: self.name(),
            price: self.price(),
            lead_time: self.lead_time(),
        }
    }
}

/// A shipping option as presented to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingOption {
    pub id: ShippingMethod,
    pub name: &'static str,
    pub price: Decimal,
    pub lead_time: &'static str,
}

impl ShippingOption {
    /// All options in display order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        ShippingMethod::ALL.iter().map(|m| m.option()).collect()
    }
}

/// Shipping cost contributed to the order total.
///
/// Shipping only counts once the address has been resolved; before that the
/// selection is remembered but costs nothing.
#[must_use]
pub fn shipping_cost(address_valid: bool, selected: ShippingMethod) -> Decimal {
    if address_valid {
        selected.price()
    } else {
        Decimal::ZERO
    }
}

/// Subtotal, shipping and total for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

/// Compute `total = subtotal + shipping_cost(address_valid, selected)`.
#[must_use]
pub fn order_totals(
    lines: &[CartLine],
    address_valid: bool,
    selected: ShippingMethod,
) -> OrderTotals {
    let subtotal = subtotal(lines);
    let shipping = shipping_cost(address_valid, selected);
    OrderTotals {
        subtotal: Price::brl(subtotal),
        shipping: Price::brl(shipping),
        total: Price::brl(subtotal + shipping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<CartLine> {
        vec![
            CartLine::new("a", "A", Decimal::new(4950, 2), 1),
            CartLine::new("b", "B", Decimal::new(1000, 2), 3),
        ]
    }

    #[test]
    fn test_options_in_order_with_free_default() {
        let options = ShippingOption::all();
        assert_eq!(options.len(), 2);
        assert_eq!(options.first().map(|o| o.id), Some(ShippingMethod::default()));
        assert_eq!(options.first().map(|o| o.price), Some(Decimal::ZERO));
        assert_eq!(options.get(1).map(|o| o.price), Some(Decimal::new(1973, 2)));
    }

    #[test]
    fn test_shipping_cost_requires_valid_address() {
        assert_eq!(shipping_cost(false, ShippingMethod::Express), Decimal::ZERO);
        assert_eq!(
            shipping_cost(true, ShippingMethod::Express),
            Decimal::new(1973, 2)
        );
        assert_eq!(shipping_cost(true, ShippingMethod::Standard), Decimal::ZERO);
    }

    #[test]
    fn test_order_totals_identity() {
        let lines = lines();
        for address_valid in [false, true] {
            for method in ShippingMethod::ALL {
                let totals = order_totals(&lines, address_valid, method);
                let expected_shipping = if address_valid {
                    method.price()
                } else {
                    Decimal::ZERO
                };
                assert_eq!(totals.subtotal.amount, Decimal::new(7950, 2));
                assert_eq!(totals.shipping.amount, expected_shipping);
                assert_eq!(
                    totals.total.amount,
                    totals.subtotal.amount + expected_shipping
                );
            }
        }
    }
}
