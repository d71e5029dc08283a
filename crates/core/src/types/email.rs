//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input contains whitespace.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The input contains more than one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MultipleAtSymbols,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) has no `name.tld` structure.
    #[error("email domain must look like name.tld")]
    MissingTld,
    /// The final domain label is shorter than two characters.
    #[error("email top-level domain must have at least 2 characters")]
    TldTooShort,
}

/// An email address with `local@domain.tld` shape.
///
/// ## Constraints
///
/// - Not empty after trimming
/// - No whitespace, exactly one @ symbol
/// - Local part (before @) must not be empty
/// - Domain must contain a dot with a non-empty name before the last dot
///   and a final label of at least 2 characters
///
/// No DNS or MX verification is performed.
///
/// ## Examples
///
/// ```
/// use vitrine_core::Email;
///
/// assert!(Email::parse("maria@email.com").is_ok());
/// assert!(Email::parse("  maria@email.com.br ").is_ok());
///
/// assert!(Email::parse("maria@email").is_err());     // no tld
/// assert!(Email::parse("maria@email.c").is_err());   // tld too short
/// assert!(Email::parse("maria @email.com").is_err()); // whitespace
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Minimum length of the final domain label.
    pub const MIN_TLD_LENGTH: usize = 2;

    /// Parse an `Email` from a string. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first shape rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MultipleAtSymbols);
        }

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        let (name, tld) = domain.rsplit_once('.').ok_or(EmailError::MissingTld)?;

        if name.is_empty() {
            return Err(EmailError::MissingTld);
        }

        if tld.chars().count() < Self::MIN_TLD_LENGTH {
            return Err(EmailError::TldTooShort);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true if `s` (trimmed) has `local@domain.tld` shape.
#[must_use]
pub fn validate_email(s: &str) -> bool {
    Email::parse(s).is_ok()
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
