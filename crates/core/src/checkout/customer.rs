//! Customer and card form state, masked on every keystroke.

use crate::types::{
    CPF_DIGITS, digits_only, mask_card_expiry, mask_card_number, mask_cpf, mask_cvv, mask_phone,
    validate_cpf,
};

/// Inline error shown under the CPF field.
pub const CPF_FIELD_ERROR: &str = "CPF inválido. Verifique os números digitados.";

/// Personal data as typed by the customer.
///
/// Phone and CPF are stored masked, exactly as displayed. Normalization for
/// the gateway happens when the charge request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    /// Inline CPF feedback, set once 11 digits have been typed.
    pub cpf_error: Option<&'static str>,
}

impl CustomerForm {
    pub fn set_name(&mut self, value: &str) {
        value.clone_into(&mut self.name);
    }

    pub fn set_email(&mut self, value: &str) {
        value.clone_into(&mut self.email);
    }

    pub fn set_phone(&mut self, value: &str) {
        self.phone = mask_phone(value);
    }

    /// Store the masked CPF and refresh the inline error.
    ///
    /// The checksum is only judged once all 11 digits are present; shorter
    /// input clears any previous error.
    pub fn set_cpf(&mut self, value: &str) {
        self.cpf = mask_cpf(value);
        self.cpf_error = if digits_only(&self.cpf).len() == CPF_DIGITS && !validate_cpf(&self.cpf)
        {
            Some(CPF_FIELD_ERROR)
        } else {
            None
        };
    }
}

/// Card details collected for the simulated card flow.
///
/// These values never leave the checkout; no card is ever charged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardForm {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardForm {
    pub fn set_number(&mut self, value: &str) {
        self.number = mask_card_number(value);
    }

    /// Holder names are printed in capitals on the card.
    pub fn set_holder(&mut self, value: &str) {
        self.holder = value.to_uppercase();
    }

    pub fn set_expiry(&mut self, value: &str) {
        self.expiry = mask_card_expiry(value);
    }

    pub fn set_cvv(&mut self, value: &str) {
        self.cvv = mask_cvv(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystrokes_are_masked() {
        let mut form = CustomerForm::default();
        form.set_phone("11987654321");
        form.set_cpf("52998224725");
        assert_eq!(form.phone, "(11) 98765-4321");
        assert_eq!(form.cpf, "529.982.247-25");
    }

    #[test]
    fn test_inline_cpf_error_only_when_complete() {
        let mut form = CustomerForm::default();
        form.set_cpf("5299822472");
        assert_eq!(form.cpf_error, None);

        form.set_cpf("52998224726");
        assert_eq!(form.cpf_error, Some(CPF_FIELD_ERROR));

        form.set_cpf("529982247");
        assert_eq!(form.cpf_error, None);

        form.set_cpf("529.982.247-25");
        assert_eq!(form.cpf_error, None);
    }

    #[test]
    fn test_card_form_masks() {
        let mut card = CardForm::default();
        card.set_number("4111111111111111");
        card.set_expiry("1229");
        card.set_cvv("1234");
        assert_eq!(card.number, "4111 1111 1111 1111");
        assert_eq!(card.expiry, "12/29");
        assert_eq!(card.cvv, "1234");
    }

    #[test]
    fn test_card_holder_is_upper_cased() {
        let mut card = CardForm::default();
        card.set_holder("maria joão oliveira");
        assert_eq!(card.holder, "MARIA JOÃO OLIVEIRA");
    }
}
