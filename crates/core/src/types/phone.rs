//! Brazilian phone number with area code (DDD).

use core::fmt;

use serde::{Deserialize, Serialize};

use super::mask::{digits_only, mask_phone};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Phone numbers must have 10 (landline) or 11 (mobile) digits.
    #[error("phone must have 10 or 11 digits including area code (got {found})")]
    InvalidLength {
        /// Number of digits found in the input.
        found: usize,
    },
}

/// A phone number stored as 10 or 11 plain digits.
///
/// ```
/// use vitrine_core::Phone;
///
/// assert_eq!(Phone::parse("(11) 98765-4321").unwrap().as_str(), "11987654321");
/// assert!(Phone::parse("(11) 3333-4444").is_ok());
/// assert!(Phone::parse("98765-4321").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number, ignoring punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input has 10 or 11 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let digits = digits_only(s);
        match digits.len() {
            10 | 11 => Ok(Self(digits)),
            found => Err(PhoneError::InvalidLength { found }),
        }
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true if `s` has 10 or 11 digits.
#[must_use]
pub fn validate_phone(s: &str) -> bool {
    Phone::parse(s).is_ok()
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask_phone(&self.0))
    }
}
