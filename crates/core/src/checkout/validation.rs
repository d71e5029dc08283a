//! Submit-time validation gate.
//!
//! Checks run in a fixed order and stop at the first failure, so a rejected
//! submit always carries exactly one message.

use super::customer::CustomerForm;
use crate::types::{validate_cpf, validate_email, validate_phone};

/// Minimum length of the customer's name, after trimming.
pub const MIN_NAME_LENGTH: usize = 3;

/// The first field that failed the gate.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Por favor, informe seu nome completo.")]
    Name,
    #[error("Por favor, informe um e-mail válido (ex: nome@email.com).")]
    Email,
    #[error("Por favor, informe um telefone válido com DDD.")]
    Phone,
    #[error("Por favor, informe um CPF válido.")]
    Cpf,
    #[error("Por favor, preencha um CEP válido.")]
    Cep,
}

impl ValidationError {
    /// Name of the offending field.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Cpf => "cpf",
            Self::Cep => "cep",
        }
    }
}

/// Run the gate: name, email, phone, CPF, then resolved CEP.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate_form(customer: &CustomerForm, cep_valid: bool) -> Result<(), ValidationError> {
    if customer.name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::Name);
    }
    if !validate_email(&customer.email) {
        return Err(ValidationError::Email);
    }
    if !validate_phone(&customer.phone) {
        return Err(ValidationError::Phone);
    }
    if !validate_cpf(&customer.cpf) {
        return Err(ValidationError::Cpf);
    }
    if !cep_valid {
        return Err(ValidationError::Cep);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_customer() -> CustomerForm {
        let mut form = CustomerForm::default();
        form.set_name("Maria Oliveira");
        form.set_email("maria@email.com");
        form.set_phone("11987654321");
        form.set_cpf("52998224725");
        form
    }

    #[test]
    fn test_valid_form_passes() {
        assert_eq!(validate_form(&valid_customer(), true), Ok(()));
    }

    #[test]
    fn test_each_single_invalid_field_is_named() {
        let cases: [(fn(&mut CustomerForm), bool, ValidationError); 5] = [
            (|f| f.set_name("  Jo "), true, ValidationError::Name),
            (|f| f.set_email("maria@email"), true, ValidationError::Email),
            (|f| f.set_phone("987654321"), true, ValidationError::Phone),
            (|f| f.set_cpf("11111111111"), true, ValidationError::Cpf),
            (|_| {}, false, ValidationError::Cep),
        ];

        for (break_field, cep_valid, expected) in cases {
            let mut form = valid_customer();
            break_field(&mut form);
            assert_eq!(validate_form(&form, cep_valid), Err(expected));
        }
    }

    #[test]
    fn test_order_is_fixed() {
        let form = CustomerForm::default();
        assert_eq!(validate_form(&form, false), Err(ValidationError::Name));
    }

    #[test]
    fn test_messages_and_fields() {
        assert_eq!(
            ValidationError::Cpf.to_string(),
            "Por favor, informe um CPF válido."
        );
        assert_eq!(ValidationError::Cep.field(), "cep");
    }
}
