//! Prioritized field extraction for the PIX payload.
//!
//! Each field the customer needs is looked up through an ordered list of
//! [`FieldRule`]s and the first non-empty match wins. New gateway field
//! names are supported by appending rules rather than by adding branches.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::OrderId;

/// Public QR rendering service used when the gateway sends no image.
pub const QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data=";

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// What the customer needs to complete a PIX payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixPaymentData {
    /// Displayable image reference: an http(s) URL or a data URL.
    pub qrcode: String,
    /// The copy-and-paste payment code.
    pub qrcode_text: String,
    #[serde(rename = "orderId", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Where a rule looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Inside the nested `pix` object.
    Pix,
    /// At the top level of `data`.
    Root,
}

/// One candidate location for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    scope: RuleScope,
    key: &'static str,
}

impl FieldRule {
    /// `data.pix.<key>`
    #[must_use]
    pub const fn pix(key: &'static str) -> Self {
        Self {
            scope: RuleScope::Pix,
            key,
        }
    }

    /// `data.<key>`
    #[must_use]
    pub const fn root(key: &'static str) -> Self {
        Self {
            scope: RuleScope::Root,
            key,
        }
    }

    /// The value at this rule's location, if present and not null.
    #[must_use]
    pub fn resolve<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let container = match self.scope {
            RuleScope::Pix => data.get("pix")?,
            RuleScope::Root => data,
        };
        container.get(self.key).filter(|value| !value.is_null())
    }

    fn resolve_str<'a>(&self, data: &'a Value) -> Option<&'a str> {
        self.resolve(data)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Payment code candidates, highest priority first.
pub const CODE_RULES: &[FieldRule] = &[
    FieldRule::pix("code"),
    FieldRule::pix("qrcode_text"),
    FieldRule::pix("pix_code"),
    FieldRule::pix("copy_paste"),
    FieldRule::pix("emv"),
    FieldRule::pix("brcode"),
    FieldRule::root("qrcode_text"),
    FieldRule::root("pix_code"),
];

/// QR image candidates, highest priority first.
pub const IMAGE_RULES: &[FieldRule] = &[
    FieldRule::pix("qr_code_base64"),
    FieldRule::pix("qrcode"),
    FieldRule::pix("qr_code"),
    FieldRule::pix("qr_code_url"),
    FieldRule::pix("qr_code_image"),
    FieldRule::root("qr_code_base64"),
    FieldRule::root("qrcode"),
    FieldRule::root("qr_code"),
];

/// Order identifier candidates.
pub const ORDER_ID_RULES: &[FieldRule] = &[
    FieldRule::root("order_id"),
    FieldRule::root("id"),
    FieldRule::root("charge_id"),
];

/// Expiry candidates.
pub const EXPIRY_RULES: &[FieldRule] = &[FieldRule::pix("expires_at"), FieldRule::root("expires_at")];

static DEFAULT_EXTRACTOR: LazyLock<PixExtractor> = LazyLock::new(PixExtractor::default);

/// Ordered rule lists for every PIX field.
#[derive(Debug, Clone)]
pub struct PixExtractor {
    code: Vec<FieldRule>,
    image: Vec<FieldRule>,
    order_id: Vec<FieldRule>,
    expiry: Vec<FieldRule>,
}

impl Default for PixExtractor {
    fn default() -> Self {
        Self {
            code: CODE_RULES.to_vec(),
            image: IMAGE_RULES.to_vec(),
            order_id: ORDER_ID_RULES.to_vec(),
            expiry: EXPIRY_RULES.to_vec(),
        }
    }
}

impl PixExtractor {
    /// Append a payment code location at the lowest priority.
    #[must_use]
    pub fn with_code_rule(mut self, rule: FieldRule) -> Self {
        self.code.push(rule);
        self
    }

    /// Append a QR image location at the lowest priority.
    #[must_use]
    pub fn with_image_rule(mut self, rule: FieldRule) -> Self {
        self.image.push(rule);
        self
    }

    /// Normalize a success payload.
    ///
    /// Returns `None` only when neither a payment code nor an image can be
    /// found. A missing image is replaced by a rendering-service URL for the
    /// code; an image that is neither a URL nor a data URL is treated as
    /// base64 PNG.
    #[must_use]
    pub fn extract(&self, data: &Value) -> Option<PixPaymentData> {
        let code = self.code.iter().find_map(|rule| rule.resolve_str(data));
        let image = self.image.iter().find_map(|rule| rule.resolve_str(data));

        let qrcode = match (image, code) {
            (Some(image), _) => normalize_image(image),
            (None, Some(code)) => qr_service_url(code),
            (None, None) => return None,
        };

        let order_id = self.order_id.iter().find_map(|rule| {
            match rule.resolve(data)? {
                Value::String(s) if !s.is_empty() => Some(OrderId::new(s.as_str())),
                Value::Number(n) => Some(OrderId::new(n.to_string())),
                _ => None,
            }
        });

        let expires_at = self.expiry.iter().find_map(|rule| {
            let raw = rule.resolve_str(data)?;
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|at| at.with_timezone(&Utc))
        });

        Some(PixPaymentData {
            qrcode,
            qrcode_text: code.unwrap_or_default().to_owned(),
            order_id,
            expires_at,
        })
    }
}

/// Normalize with the default rule lists.
#[must_use]
pub fn extract_pix_data(data: &Value) -> Option<PixPaymentData> {
    DEFAULT_EXTRACTOR.extract(data)
}

/// Rendering-service URL for `code`.
#[must_use]
pub fn qr_service_url(code: &str) -> String {
    format!("{QR_SERVICE_URL}{}", urlencoding::encode(code))
}

fn normalize_image(image: &str) -> String {
    if image.starts_with("http") || image.starts_with("data:") {
        image.to_owned()
    } else {
        format!("{PNG_DATA_URL_PREFIX}{image}")
    }
}
