//! CPF (Cadastro de Pessoas Físicas) taxpayer number.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::mask::{CPF_DIGITS, digits_only, mask_cpf};

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// The input does not contain exactly 11 digits.
    #[error("CPF must have 11 digits (got {found})")]
    WrongLength {
        /// Number of digits found in the input.
        found: usize,
    },
    /// All 11 digits are the same (e.g. `111.111.111-11`).
    #[error("CPF cannot have all digits equal")]
    RepeatedDigits,
    /// One of the two check digits does not match.
    #[error("CPF check digit {position} does not match")]
    CheckDigitMismatch {
        /// 1-based position of the failing check digit (10 or 11).
        position: usize,
    },
}

/// A CPF whose check digits have been verified.
///
/// Stored as 11 plain digits. Use [`Cpf::formatted`] for the
/// `000.000.000-00` display form.
///
/// ## Check digit algorithm
///
/// - Digit 10: weights 10..2 over the first 9 digits
/// - Digit 11: weights 11..2 over the first 10 digits
/// - For each: `r = (sum * 10) % 11`, and `r == 10` becomes `0`
///
/// ## Examples
///
/// ```
/// use vitrine_core::Cpf;
///
/// let cpf = Cpf::parse("529.982.247-25").unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
/// assert_eq!(cpf.formatted(), "529.982.247-25");
///
/// assert!(Cpf::parse("111.111.111-11").is_err());
/// assert!(Cpf::parse("529.982.247-26").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Parse a CPF, ignoring any punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not have 11 digits, if all digits
    /// are equal, or if either check digit is wrong.
    pub fn parse(s: &str) -> Result<Self, CpfError> {
        let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
        // to_digit(10) accepts only ASCII digits, same set as digits_only
        let [first, rest @ ..] = digits.as_slice() else {
            return Err(CpfError::WrongLength { found: 0 });
        };

        if digits.len() != CPF_DIGITS {
            return Err(CpfError::WrongLength {
                found: digits.len(),
            });
        }

        if rest.iter().all(|d| d == first) {
            return Err(CpfError::RepeatedDigits);
        }

        for position in [10, 11] {
            let body = digits.get(..position - 1).unwrap_or_default();
            let supplied = digits.get(position - 1).copied();
            if supplied != Some(check_digit(body)) {
                return Err(CpfError::CheckDigitMismatch { position });
            }
        }

        Ok(Self(digits_only(s)))
    }

    /// Returns the 11 digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the CPF in `000.000.000-00` form.
    #[must_use]
    pub fn formatted(&self) -> String {
        mask_cpf(&self.0)
    }

    /// Returns the CPF with all but the last two digits hidden, for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let tail: String = self.0.chars().skip(CPF_DIGITS - 2).collect();
        format!("***.***.***-{tail}")
    }
}

/// Compute a CPF check digit for `body`.
///
/// Weights run from `body.len() + 1` down to 2.
fn check_digit(body: &[u32]) -> u32 {
    let top = u32::try_from(body.len()).unwrap_or(0) + 1;
    let sum: u32 = body
        .iter()
        .zip((2..=top).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        r => r,
    }
}

/// Returns true if `s` is a valid CPF (punctuation ignored).
#[must_use]
pub fn validate_cpf(s: &str) -> bool {
    Cpf::parse(s).is_ok()
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cpf {
    type Error = CpfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Textbook formulation: `11 - (sum % 11)`, values 10 and 11 become 0.
    fn reference_check_digit(digits: &[u32]) -> u32 {
        let n = u32::try_from(digits.len()).unwrap() + 1;
        let mut sum = 0;
        for (i, d) in digits.iter().enumerate() {
            sum += d * (n - u32::try_from(i).unwrap());
        }
        let dv = 11 - (sum % 11);
        if dv >= 10 { 0 } else { dv }
    }

    fn reference_validate(s: &str) -> bool {
        let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
            return false;
        }
        reference_check_digit(&digits[..9]) == digits[9]
            && reference_check_digit(&digits[..10]) == digits[10]
    }

    /// Build an 11-digit CPF from a 9-digit body using the reference algorithm.
    fn reference_complete(body: u64) -> String {
        let mut digits: Vec<u32> = format!("{body:09}")
            .chars()
            .map(|c| c.to_digit(10).unwrap())
            .collect();
        digits.push(reference_check_digit(&digits));
        digits.push(reference_check_digit(&digits));
        digits.iter().map(u32::to_string).collect()
    }

    #[test]
    fn test_known_valid_cpf() {
        assert!(validate_cpf("529.982.247-25"));
        assert!(validate_cpf("52998224725"));
    }

    #[test]
    fn test_repeated_digits_rejected() {
        assert!(!validate_cpf("11111111111"));
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            assert_eq!(Cpf::parse(&cpf), Err(CpfError::RepeatedDigits));
        }
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(Cpf::parse(""), Err(CpfError::WrongLength { found: 0 }));
        assert_eq!(
            Cpf::parse("529.982.247-2"),
            Err(CpfError::WrongLength { found: 10 })
        );
        assert_eq!(
            Cpf::parse("529.982.247-255"),
            Err(CpfError::WrongLength { found: 12 })
        );
    }

    #[test]
    fn test_check_digit_mismatch_positions() {
        assert_eq!(
            Cpf::parse("529.982.247-35"),
            Err(CpfError::CheckDigitMismatch { position: 10 })
        );
        assert_eq!(
            Cpf::parse("529.982.247-26"),
            Err(CpfError::CheckDigitMismatch { position: 11 })
        );
    }

    #[test]
    fn test_matches_reference_on_generated_cpfs() {
        for body in (0..1_000_000_000_u64).step_by(7_777_777) {
            let valid = reference_complete(body);
            assert_eq!(validate_cpf(&valid), reference_validate(&valid), "{valid}");

            // Every single-digit corruption of the last two digits
            let prefix = &valid[..9];
            for tail in 0..100 {
                let candidate = format!("{prefix}{tail:02}");
                assert_eq!(
                    validate_cpf(&candidate),
                    reference_validate(&candidate),
                    "{candidate}"
                );
            }
        }
    }

    #[test]
    fn test_formatted_and_redacted() {
        let cpf = Cpf::parse("52998224725").unwrap();
        assert_eq!(cpf.formatted(), "529.982.247-25");
        assert_eq!(cpf.to_string(), "529.982.247-25");
        assert_eq!(cpf.redacted(), "***.***.***-25");
    }

    #[test]
    fn test_serde_roundtrip_rejects_invalid() {
        let cpf = Cpf::parse("529.982.247-25").unwrap();
        let json = serde_json::to_string(&cpf).unwrap();
        assert_eq!(json, "\"52998224725\"");
        assert_eq!(serde_json::from_str::<Cpf>(&json).unwrap(), cpf);
        assert!(serde_json::from_str::<Cpf>("\"11111111111\"").is_err());
    }
}
