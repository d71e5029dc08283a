//! Input masks for checkout form fields.
//!
//! Every mask follows the same recipe: strip everything that is not an ASCII
//! digit, truncate to the field's maximum digit count, then re-insert the
//! separators at fixed positions. Because the digits are re-derived from
//! scratch each time, masking is idempotent: `mask(mask(x)) == mask(x)`.
//!
//! ```
//! use vitrine_core::{mask_cep, mask_cpf, mask_phone};
//!
//! assert_eq!(mask_cpf("52998224725"), "529.982.247-25");
//! assert_eq!(mask_phone("11987654321"), "(11) 98765-4321");
//! assert_eq!(mask_phone("1133334444"), "(11) 3333-4444");
//! assert_eq!(mask_cep("01001000"), "01001-000");
//! ```

/// Maximum number of digits in a CPF.
pub const CPF_DIGITS: usize = 11;
/// Maximum number of digits in a phone number (area code + mobile).
pub const PHONE_DIGITS: usize = 11;
/// Number of digits in a CEP.
pub const CEP_DIGITS: usize = 8;
/// Maximum number of digits in a card number.
pub const CARD_NUMBER_DIGITS: usize = 16;
/// Number of digits in a card expiry (`MMYY`).
pub const CARD_EXPIRY_DIGITS: usize = 4;
/// Maximum number of digits in a card security code.
pub const CVV_DIGITS: usize = 4;

/// Strip every character that is not an ASCII digit.
#[must_use]
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Strip non-digits and keep at most `max` digits.
fn leading_digits(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Rebuild `digits`, inserting `separator(index)` before the digit at `index`.
fn interleave(digits: &str, separator: impl Fn(usize) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(digits.len() + 4);
    for (index, digit) in digits.chars().enumerate() {
        if let Some(sep) = separator(index) {
            out.push_str(sep);
        }
        out.push(digit);
    }
    out
}

/// Mask a CPF as `000.000.000-00`.
#[must_use]
pub fn mask_cpf(value: &str) -> String {
    let digits = leading_digits(value, CPF_DIGITS);
    interleave(&digits, |index| match index {
        3 | 6 => Some("."),
        9 => Some("-"),
        _ => None,
    })
}

/// Mask a phone number as `(00) 0000-0000` (landline) or `(00) 00000-0000`
/// (mobile).
///
/// While fewer than 11 digits have been typed the landline layout is used;
/// the eleventh digit shifts the hyphen one position to the right.
#[must_use]
pub fn mask_phone(value: &str) -> String {
    let digits = leading_digits(value, PHONE_DIGITS);
    let hyphen_at = if digits.len() > 10 { 7 } else { 6 };
    interleave(&digits, |index| match index {
        0 => Some("("),
        2 => Some(") "),
        i if i == hyphen_at => Some("-"),
        _ => None,
    })
}

/// Mask a CEP as `00000-000`.
#[must_use]
pub fn mask_cep(value: &str) -> String {
    let digits = leading_digits(value, CEP_DIGITS);
    interleave(&digits, |index| (index == 5).then_some("-"))
}

/// Mask a card number as groups of four digits separated by spaces.
#[must_use]
pub fn mask_card_number(value: &str) -> String {
    let digits = leading_digits(value, CARD_NUMBER_DIGITS);
    interleave(&digits, |index| {
        (index > 0 && index % 4 == 0).then_some(" ")
    })
}

/// Mask a card expiry as `MM/YY`.
#[must_use]
pub fn mask_card_expiry(value: &str) -> String {
    let digits = leading_digits(value, CARD_EXPIRY_DIGITS);
    interleave(&digits, |index| (index == 2).then_some("/"))
}

/// Mask a card security code (digits only, at most four).
#[must_use]
pub fn mask_cvv(value: &str) -> String {
    leading_digits(value, CVV_DIGITS)
}
