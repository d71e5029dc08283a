//! CEP (Código de Endereçamento Postal) postal code.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::mask::{CEP_DIGITS, digits_only, mask_cep};

/// Errors that can occur when parsing a [`Cep`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CepError {
    /// The input does not contain exactly 8 digits.
    #[error("CEP must have 8 digits (got {found})")]
    WrongLength {
        /// Number of digits found in the input.
        found: usize,
    },
}

/// A postal code stored as 8 plain digits.
///
/// A `Cep` only guarantees the shape; whether it exists is decided by the
/// address directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cep(String);

impl Cep {
    /// Parse a CEP, ignoring punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input has exactly 8 digits.
    pub fn parse(s: &str) -> Result<Self, CepError> {
        let digits = digits_only(s);
        if digits.len() == CEP_DIGITS {
            Ok(Self(digits))
        } else {
            Err(CepError::WrongLength {
                found: digits.len(),
            })
        }
    }

    /// Returns the 8 digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask_cep(&self.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Cep::parse("01001-000").unwrap().as_str(), "01001000");
        assert_eq!(Cep::parse("0100100"), Err(CepError::WrongLength { found: 7 }));
        assert_eq!(
            Cep::parse("010010001"),
            Err(CepError::WrongLength { found: 9 })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Cep::parse("01001000").unwrap().to_string(), "01001-000");
    }
}
