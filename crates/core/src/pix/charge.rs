//! Charge request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::{PixPaymentData, extract_pix_data};
use crate::checkout::CustomerForm;
use crate::types::{ProductId, digits_only};

/// Fallback shown when the gateway rejects a charge without saying why.
pub const GENERIC_PAYMENT_ERROR: &str =
    "Erro ao processar pagamento. Verifique seus dados e tente novamente.";

/// Body of a PIX charge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub name: String,
    pub email: String,
    /// Digits only.
    pub phone: String,
    /// Digits only.
    pub cpf: String,
    /// Total in centavos.
    pub amount: i64,
    pub items: Vec<ChargeItem>,
}

/// A charged line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeItem {
    pub id: ProductId,
    /// Value in centavos.
    pub value: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl ChargeRequest {
    /// Build a request for `amount` centavos from the checkout form.
    ///
    /// Name and email are trimmed, phone and CPF reduced to digits. The
    /// whole order is charged as a single item of `product_id`.
    #[must_use]
    pub fn new(customer: &CustomerForm, amount: i64, product_id: ProductId) -> Self {
        Self {
            name: customer.name.trim().to_owned(),
            email: customer.email.trim().to_owned(),
            phone: digits_only(&customer.phone),
            cpf: digits_only(&customer.cpf),
            amount,
            items: vec![ChargeItem {
                id: product_id,
                value: amount,
                quantity: 1,
            }],
        }
    }
}

/// The gateway's response envelope.
///
/// Deserialization never fails on shape: anything missing or of the wrong
/// type is treated as absent, and a missing `success` counts as failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ChargeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Usually `{field: [messages]}`, but kept raw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl ChargeResponse {
    /// A failure envelope carrying only a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    /// The normalized PIX payload, if the charge succeeded and carries one.
    #[must_use]
    pub fn pix_data(&self) -> Option<PixPaymentData> {
        if !self.success {
            return None;
        }
        self.data.as_ref().and_then(extract_pix_data)
    }
}

impl From<Value> for ChargeResponse {
    fn from(value: Value) -> Self {
        Self {
            success: value
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_owned),
            data: value.get("data").filter(|d| d.is_object()).cloned(),
            errors: value.get("errors").filter(|e| !e.is_null()).cloned(),
        }
    }
}

/// Turn a rejected charge into one user-facing message.
///
/// Preference: the top-level `message`; otherwise every message in the
/// `errors` map, flattened in order and joined with `". "`; otherwise
/// [`GENERIC_PAYMENT_ERROR`].
#[must_use]
pub fn format_api_error(response: &ChargeResponse) -> String {
    if let Some(message) = &response.message {
        return message.clone();
    }

    let messages = response
        .errors
        .as_ref()
        .map(error_messages)
        .unwrap_or_default();

    if messages.is_empty() {
        GENERIC_PAYMENT_ERROR.to_owned()
    } else {
        messages.join(". ")
    }
}

fn error_messages(errors: &Value) -> Vec<&str> {
    match errors {
        Value::Object(fields) => fields.values().flat_map(messages_in).collect(),
        other => messages_in(other),
    }
}

fn messages_in(value: &Value) -> Vec<&str> {
    match value {
        Value::String(message) if !message.is_empty() => vec![message.as_str()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|m| !m.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
