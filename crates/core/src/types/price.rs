//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors converting a [`Price`] to minor units.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount does not fit in an `i64` number of cents.
    #[error("amount {0} is out of range for minor units")]
    OutOfRange(Decimal),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// Convert to integer minor units (centavos).
    ///
    /// Rounds half away from zero, so `19.735` becomes `1974`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::OutOfRange`] if the result does not fit an `i64`.
    pub fn to_minor_units(&self) -> Result<i64, PriceError> {
        self.amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| {
                cents
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
            })
            .ok_or(PriceError::OutOfRange(self.amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{} {rounded:.2}", self.currency_code.symbol())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(Price::brl(Decimal::new(1973, 2)).to_minor_units(), Ok(1973));
        assert_eq!(Price::brl(Decimal::new(4950, 2)).to_minor_units(), Ok(4950));
        assert_eq!(Price::brl(Decimal::ZERO).to_minor_units(), Ok(0));
    }

    #[test]
    fn test_to_minor_units_rounds_half_away_from_zero() {
        assert_eq!(Price::brl(Decimal::new(19_735, 3)).to_minor_units(), Ok(1974));
        assert_eq!(Price::brl(Decimal::new(19_734, 3)).to_minor_units(), Ok(1973));
    }

    #[test]
    fn test_to_minor_units_out_of_range() {
        assert!(Price::brl(Decimal::MAX).to_minor_units().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::brl(Decimal::new(1973, 2)).to_string(), "R$ 19.73");
        assert_eq!(Price::brl(Decimal::ZERO).to_string(), "R$ 0.00");
        assert_eq!(Price::brl(Decimal::new(5, 0)).to_string(), "R$ 5.00");
    }
}
